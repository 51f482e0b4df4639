//! Seed data the store starts from.

use crate::error::{ForumError, ForumResult};
use crate::model::{Category, Post, User};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const BUILTIN_SEED: &str = include_str!("seed.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    pub viewer: User,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl SeedData {
    /// The demo forum shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_SEED).context("built-in seed data is invalid")
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let seed: SeedData = serde_json::from_str(raw).context("failed to parse seed json")?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid seed file {}", path.display()))
    }

    /// Checks every entity plus cross-entity id uniqueness.
    pub fn validate(&self) -> ForumResult<()> {
        self.viewer.validate()?;

        let mut category_ids = HashSet::new();
        for category in &self.categories {
            category.validate()?;
            if !category_ids.insert(category.id.as_str()) {
                return Err(ForumError::validation(format!(
                    "duplicate category id {}",
                    category.id
                )));
            }
        }

        let mut post_ids = HashSet::new();
        for post in &self.posts {
            post.validate()?;
            if !post_ids.insert(post.id.as_str()) {
                return Err(ForumError::validation(format!(
                    "duplicate post id {}",
                    post.id
                )));
            }
            let mut comment_ids = HashSet::new();
            for comment in post.comments_list.iter().flatten() {
                if !comment_ids.insert(comment.id.as_str()) {
                    return Err(ForumError::validation(format!(
                        "duplicate comment id {} on post {}",
                        comment.id, post.id
                    )));
                }
            }
        }
        Ok(())
    }
}
