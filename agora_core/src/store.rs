//! The process-wide owner of forum state.
//!
//! `ForumStore` holds the current snapshot, the category list and the
//! viewer. Every mutation goes through [`ForumStore::dispatch`], which runs
//! the engine and swaps in the snapshot it returns.

use crate::config::AgoraConfig;
use crate::engine::{self, IdGenerator, Intent, IntentContext, Snapshot, UuidIds};
use crate::error::{ForumError, ForumResult};
use crate::model::{Category, Post, PostDraft, PostEdit, ProfileUpdate, User};
use crate::query::{self, CategoryFilter, SortMode};
use crate::seed::SeedData;
use crate::utils::now_utc;
use anyhow::{Context, Result};
use std::collections::HashSet;

const MAX_FRESH_ATTEMPTS: usize = 32;

/// Wraps the configured generator so no id seen during the session, deleted
/// or not, is handed out twice.
struct SessionIds {
    inner: Box<dyn IdGenerator>,
    seen: HashSet<String>,
}

impl SessionIds {
    fn new(inner: Box<dyn IdGenerator>, snapshot: &Snapshot) -> Self {
        let mut seen = HashSet::new();
        for post in snapshot.posts() {
            seen.insert(post.id.clone());
            for comment in post.comments_list.iter().flatten() {
                seen.insert(comment.id.clone());
            }
        }
        Self { inner, seen }
    }
}

impl IdGenerator for SessionIds {
    fn next_id(&mut self) -> String {
        for _ in 0..MAX_FRESH_ATTEMPTS {
            let candidate = self.inner.next_id();
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
        }
        tracing::warn!("configured id generator keeps repeating; falling back to uuid");
        loop {
            let candidate = UuidIds.next_id();
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

pub struct ForumStore {
    snapshot: Snapshot,
    categories: Vec<Category>,
    viewer: User,
    ids: SessionIds,
    default_image: Option<String>,
    revision: u64,
}

impl ForumStore {
    pub fn new(seed: SeedData, config: &AgoraConfig) -> ForumResult<Self> {
        seed.validate()?;
        let generator = config
            .id_strategy
            .generator(seed.posts.iter().map(|post| post.id.as_str()));
        let snapshot = Snapshot::new(seed.posts);
        let ids = SessionIds::new(generator, &snapshot);
        tracing::info!(
            posts = snapshot.len(),
            categories = seed.categories.len(),
            viewer = %seed.viewer.username,
            "forum store seeded"
        );
        Ok(Self {
            snapshot,
            categories: seed.categories,
            viewer: seed.viewer,
            ids,
            default_image: config.default_image.clone(),
            revision: 0,
        })
    }

    /// Loads the configured seed file, or the built-in seed when none is set.
    pub fn from_config(config: &AgoraConfig) -> Result<Self> {
        let seed = match &config.seed_path {
            Some(path) => SeedData::load(path)?,
            None => SeedData::builtin()?,
        };
        Self::new(seed, config).context("seed data failed validation")
    }

    /// Swaps the configured id generator, e.g. for deterministic ids in tests.
    pub fn with_id_generator(mut self, generator: Box<dyn IdGenerator>) -> Self {
        self.ids.inner = generator;
        self
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    /// Number of intents applied since seeding.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn viewer(&self) -> &User {
        &self.viewer
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn list_posts(&self, filter: &CategoryFilter, sort: SortMode) -> Vec<Post> {
        let mut posts = query::filter_by_category(self.snapshot.posts(), filter);
        query::sort_posts(&mut posts, sort);
        tracing::debug!(?filter, %sort, matched = posts.len(), "listing posts");
        posts.into_iter().cloned().collect()
    }

    pub fn get_post(&self, post_id: &str) -> ForumResult<Post> {
        self.snapshot
            .get(post_id)
            .cloned()
            .ok_or_else(|| ForumError::post_not_found(post_id))
    }

    /// Applies one intent and returns the post it touched (the removed post
    /// for deletions).
    pub fn dispatch(&mut self, intent: Intent) -> ForumResult<Post> {
        let name = intent.name();
        let target = intent.post_id().map(str::to_string);
        let ctx = IntentContext {
            viewer: self.viewer.author_ref(),
            now: now_utc(),
            default_image: self.default_image.clone(),
        };
        match engine::apply(&self.snapshot, intent, &ctx, &mut self.ids) {
            Ok(transition) => {
                self.snapshot = transition.snapshot;
                self.revision += 1;
                tracing::info!(
                    intent = name,
                    post_id = %transition.post.id,
                    upvotes = transition.post.upvotes,
                    comments = transition.post.comments,
                    revision = self.revision,
                    "intent applied"
                );
                Ok(transition.post)
            }
            Err(err) => {
                tracing::warn!(intent = name, post_id = ?target, error = %err, "intent rejected");
                Err(err)
            }
        }
    }

    pub fn toggle_upvote(&mut self, post_id: &str) -> ForumResult<Post> {
        self.dispatch(Intent::ToggleUpvote {
            post_id: post_id.to_string(),
        })
    }

    pub fn toggle_bookmark(&mut self, post_id: &str) -> ForumResult<Post> {
        self.dispatch(Intent::ToggleBookmark {
            post_id: post_id.to_string(),
        })
    }

    pub fn toggle_like(&mut self, post_id: &str) -> ForumResult<Post> {
        self.dispatch(Intent::ToggleLike {
            post_id: post_id.to_string(),
        })
    }

    pub fn add_comment(&mut self, post_id: &str, text: &str) -> ForumResult<Post> {
        self.dispatch(Intent::AddComment {
            post_id: post_id.to_string(),
            text: text.to_string(),
        })
    }

    pub fn create_post(&mut self, draft: PostDraft) -> ForumResult<Post> {
        self.dispatch(Intent::CreatePost { draft })
    }

    pub fn edit_post(&mut self, post_id: &str, fields: PostEdit) -> ForumResult<Post> {
        self.dispatch(Intent::EditPost {
            post_id: post_id.to_string(),
            fields,
        })
    }

    pub fn delete_post(&mut self, post_id: &str) -> ForumResult<Post> {
        self.dispatch(Intent::DeletePost {
            post_id: post_id.to_string(),
        })
    }

    pub fn list_categories(&self, search_query: &str) -> Vec<Category> {
        query::search_categories(&self.categories, search_query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn trending_categories(&self) -> Vec<Category> {
        query::trending_categories(&self.categories)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn posts_in_category(&self, category_id: &str, sort: SortMode) -> ForumResult<Vec<Post>> {
        let mut posts =
            query::posts_in_category(self.snapshot.posts(), &self.categories, category_id)?;
        query::sort_posts(&mut posts, sort);
        Ok(posts.into_iter().cloned().collect())
    }

    /// Posts authored by the viewer, in collection order.
    pub fn my_threads(&self) -> Vec<Post> {
        query::authored_by(self.snapshot.posts(), &self.viewer.id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn bookmarks(&self) -> Vec<Post> {
        query::bookmarked(self.snapshot.posts())
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn search_posts(&self, search_query: &str) -> Vec<Post> {
        query::search_posts(self.snapshot.posts(), search_query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Edits the viewer's profile. Content already authored keeps the author
    /// details it was created with.
    pub fn update_profile(&mut self, update: ProfileUpdate) -> ForumResult<User> {
        let updated = self.viewer.with_profile(update)?;
        tracing::info!(username = %updated.username, "profile updated");
        self.viewer = updated.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdStrategy;
    use crate::engine::SequentialIds;

    fn store() -> ForumStore {
        let config = AgoraConfig {
            id_strategy: IdStrategy::Sequential,
            ..AgoraConfig::default()
        };
        ForumStore::new(SeedData::builtin().unwrap(), &config).expect("store")
    }

    #[test]
    fn dispatch_bumps_revision_only_on_success() {
        let mut store = store();
        store.toggle_bookmark("1").unwrap();
        assert_eq!(store.revision(), 1);
        assert!(store.toggle_bookmark("missing").unwrap_err().is_not_found());
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn held_snapshots_do_not_change() {
        let mut store = store();
        let before = store.snapshot();
        store.toggle_upvote("1").unwrap();
        assert_eq!(before.get("1").unwrap().upvotes, 42);
        assert_eq!(store.get_post("1").unwrap().upvotes, 43);
    }

    #[test]
    fn sequential_ids_continue_after_seed() {
        let mut store = store();
        let created = store.create_post(PostDraft::new("Hi", "Body")).unwrap();
        assert_eq!(created.id, "5");
    }

    #[test]
    fn deleted_ids_are_never_reissued() {
        let mut store = store().with_id_generator(Box::new(SequentialIds::starting_at(4)));
        store.delete_post("4").unwrap();
        let created = store.create_post(PostDraft::new("Hi", "Body")).unwrap();
        assert_ne!(created.id, "4");
        assert_eq!(created.id, "5");
    }

    #[test]
    fn profile_update_changes_future_authorship_only() {
        let mut store = store();
        store
            .update_profile(ProfileUpdate {
                username: "renamed".into(),
                bio: "bio".into(),
                avatar: "new.png".into(),
            })
            .unwrap();
        assert_eq!(store.get_post("3").unwrap().author.username, "currentuser");
        let post = store.add_comment("3", "hello").unwrap();
        let comment = &post.comments_list.unwrap()[0];
        assert_eq!(comment.author.username, "renamed");
        assert_eq!(store.my_threads().len(), 2);
    }
}
