use crate::engine::{IdGenerator, SequentialIds, UuidIds};
use crate::utils::DEFAULT_POST_IMAGE;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AgoraConfig {
    /// JSON seed file; the built-in seed is used when unset.
    pub seed_path: Option<PathBuf>,
    pub id_strategy: IdStrategy,
    /// Image given to new posts created without one. Empty disables it.
    pub default_image: Option<String>,
    /// How many posts the CLI prints per listing.
    pub list_limit: usize,
}

impl Default for AgoraConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            id_strategy: IdStrategy::default(),
            default_image: Some(DEFAULT_POST_IMAGE.to_string()),
            list_limit: 20,
        }
    }
}

impl AgoraConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests do not need to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed_path = lookup("AGORA_SEED_PATH").and_then(|raw| {
            if raw.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(raw))
            }
        });
        let id_strategy = lookup("AGORA_ID_STRATEGY")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.id_strategy);
        let default_image = match lookup("AGORA_DEFAULT_IMAGE") {
            Some(raw) if raw.trim().is_empty() => None,
            Some(raw) => Some(raw),
            None => defaults.default_image,
        };
        let list_limit = lookup("AGORA_LIST_LIMIT")
            .and_then(|raw| raw.parse::<usize>().ok())
            .filter(|limit| *limit > 0)
            .unwrap_or(defaults.list_limit);

        Self {
            seed_path,
            id_strategy,
            default_image,
            list_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    #[default]
    Uuid,
    /// Decimal counter continuing after the largest numeric seed id.
    Sequential,
}

impl IdStrategy {
    pub fn generator<'a, I>(self, existing: I) -> Box<dyn IdGenerator>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self {
            IdStrategy::Uuid => Box::new(UuidIds),
            IdStrategy::Sequential => Box::new(SequentialIds::after(existing)),
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "uuid" => Ok(IdStrategy::Uuid),
            "sequential" | "seq" => Ok(IdStrategy::Sequential),
            other => Err(format!("unknown id strategy '{other}'")),
        }
    }
}
