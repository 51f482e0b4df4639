//! Pure state transitions over a snapshot of posts.
//!
//! Every operation reads the snapshot it is handed and returns a new one;
//! nothing here touches the caller's data or performs I/O.

use crate::error::{ForumError, ForumResult};
use crate::model::{AuthorRef, Comment, Post, PostDraft, PostEdit};
use crate::utils::is_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Immutable collection of posts at a point in time. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Snapshot {
    posts: Arc<[Post]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Snapshot {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: Arc::from(posts),
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn get(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == post_id)
    }

    pub fn contains(&self, post_id: &str) -> bool {
        self.get(post_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    fn position(&self, post_id: &str) -> Option<usize> {
        self.posts.iter().position(|post| post.id == post_id)
    }
}

/// Result of a successful intent: the next snapshot and the post it touched.
/// For deletions `post` is the removed post.
#[derive(Debug, Clone)]
pub struct Transition {
    pub snapshot: Snapshot,
    pub post: Post,
}

/// Who is acting and when.
#[derive(Debug, Clone)]
pub struct IntentContext {
    pub viewer: AuthorRef,
    pub now: DateTime<Utc>,
    pub default_image: Option<String>,
}

pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic decimal ids, matching the numeric ids of the seed data.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Starts one past the largest numeric id in `existing`; non-numeric ids
    /// are ignored.
    pub fn after<'a, I>(existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let max = existing
            .into_iter()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self::starting_at(max.saturating_add(1))
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id.to_string()
    }
}

const MAX_ID_ATTEMPTS: usize = 16;

/// A named user action against the post collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    ToggleUpvote { post_id: String },
    ToggleBookmark { post_id: String },
    ToggleLike { post_id: String },
    AddComment { post_id: String, text: String },
    EditPost { post_id: String, fields: PostEdit },
    CreatePost { draft: PostDraft },
    DeletePost { post_id: String },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::ToggleUpvote { .. } => "toggle_upvote",
            Intent::ToggleBookmark { .. } => "toggle_bookmark",
            Intent::ToggleLike { .. } => "toggle_like",
            Intent::AddComment { .. } => "add_comment",
            Intent::EditPost { .. } => "edit_post",
            Intent::CreatePost { .. } => "create_post",
            Intent::DeletePost { .. } => "delete_post",
        }
    }

    /// Target post, if the intent addresses an existing one.
    pub fn post_id(&self) -> Option<&str> {
        match self {
            Intent::ToggleUpvote { post_id }
            | Intent::ToggleBookmark { post_id }
            | Intent::ToggleLike { post_id }
            | Intent::AddComment { post_id, .. }
            | Intent::EditPost { post_id, .. }
            | Intent::DeletePost { post_id } => Some(post_id),
            Intent::CreatePost { .. } => None,
        }
    }
}

pub fn apply(
    snapshot: &Snapshot,
    intent: Intent,
    ctx: &IntentContext,
    ids: &mut dyn IdGenerator,
) -> ForumResult<Transition> {
    match intent {
        Intent::ToggleUpvote { post_id } => toggle_upvote(snapshot, &post_id),
        Intent::ToggleBookmark { post_id } => toggle_bookmark(snapshot, &post_id),
        Intent::ToggleLike { post_id } => toggle_like(snapshot, &post_id),
        Intent::AddComment { post_id, text } => add_comment(snapshot, &post_id, &text, ctx, ids),
        Intent::EditPost { post_id, fields } => edit_post(snapshot, &post_id, fields),
        Intent::CreatePost { draft } => create_post(snapshot, draft, ctx, ids),
        Intent::DeletePost { post_id } => delete_post(snapshot, &post_id),
    }
}

pub fn toggle_upvote(snapshot: &Snapshot, post_id: &str) -> ForumResult<Transition> {
    replace_post(snapshot, post_id, |post| {
        let upvotes = if post.is_upvoted {
            post.upvotes.checked_sub(1).ok_or_else(|| {
                ForumError::validation(format!("post {post_id} has no upvote to remove"))
            })?
        } else {
            post.upvotes.checked_add(1).ok_or_else(|| {
                ForumError::validation(format!("post {post_id} upvote counter is saturated"))
            })?
        };
        Ok(Post {
            upvotes,
            is_upvoted: !post.is_upvoted,
            ..post.clone()
        })
    })
}

pub fn toggle_bookmark(snapshot: &Snapshot, post_id: &str) -> ForumResult<Transition> {
    replace_post(snapshot, post_id, |post| {
        Ok(Post {
            is_bookmarked: !post.is_bookmarked,
            ..post.clone()
        })
    })
}

pub fn toggle_like(snapshot: &Snapshot, post_id: &str) -> ForumResult<Transition> {
    replace_post(snapshot, post_id, |post| {
        Ok(Post {
            is_liked: !post.is_liked,
            ..post.clone()
        })
    })
}

/// Appends a comment and bumps the count in the same step.
///
/// A post that only carries a count (no list) cannot take new comments:
/// appending would leave the count and the list disagreeing.
pub fn add_comment(
    snapshot: &Snapshot,
    post_id: &str,
    text: &str,
    ctx: &IntentContext,
    ids: &mut dyn IdGenerator,
) -> ForumResult<Transition> {
    if is_blank(text) {
        return Err(ForumError::validation("comment text may not be empty"));
    }
    replace_post(snapshot, post_id, |post| {
        let mut list = match &post.comments_list {
            Some(list) => list.clone(),
            None if post.comments == 0 => Vec::new(),
            None => {
                return Err(ForumError::validation(format!(
                    "post {post_id} has {} comments that are not loaded",
                    post.comments
                )))
            }
        };
        let comment_id = fresh_id(ids, |candidate| {
            list.iter().any(|comment| comment.id == candidate)
        })?;
        list.push(Comment {
            id: comment_id,
            author: ctx.viewer.clone(),
            content: text.to_string(),
            created_at: ctx.now,
        });
        let comments = u32::try_from(list.len())
            .map_err(|_| ForumError::validation(format!("post {post_id} has too many comments")))?;
        Ok(Post {
            comments,
            comments_list: Some(list),
            ..post.clone()
        })
    })
}

pub fn edit_post(snapshot: &Snapshot, post_id: &str, fields: PostEdit) -> ForumResult<Transition> {
    if !snapshot.contains(post_id) {
        return Err(ForumError::post_not_found(post_id));
    }
    fields.validate()?;
    replace_post(snapshot, post_id, |post| {
        Ok(Post {
            title: fields.title,
            content: fields.content,
            image: fields.image.filter(|image| !is_blank(image)),
            ..post.clone()
        })
    })
}

pub fn create_post(
    snapshot: &Snapshot,
    draft: PostDraft,
    ctx: &IntentContext,
    ids: &mut dyn IdGenerator,
) -> ForumResult<Transition> {
    draft.validate()?;
    let id = fresh_id(ids, |candidate| snapshot.contains(candidate))?;
    let post = Post::new(
        id,
        draft,
        ctx.viewer.clone(),
        ctx.now,
        ctx.default_image.as_deref(),
    )?;
    let mut posts = snapshot.posts().to_vec();
    posts.push(post.clone());
    Ok(Transition {
        snapshot: Snapshot::new(posts),
        post,
    })
}

pub fn delete_post(snapshot: &Snapshot, post_id: &str) -> ForumResult<Transition> {
    let index = snapshot
        .position(post_id)
        .ok_or_else(|| ForumError::post_not_found(post_id))?;
    let mut posts = snapshot.posts().to_vec();
    let removed = posts.remove(index);
    Ok(Transition {
        snapshot: Snapshot::new(posts),
        post: removed,
    })
}

fn replace_post<F>(snapshot: &Snapshot, post_id: &str, update: F) -> ForumResult<Transition>
where
    F: FnOnce(&Post) -> ForumResult<Post>,
{
    let index = snapshot
        .position(post_id)
        .ok_or_else(|| ForumError::post_not_found(post_id))?;
    let updated = update(&snapshot.posts()[index])?;
    let mut posts = snapshot.posts().to_vec();
    posts[index] = updated.clone();
    Ok(Transition {
        snapshot: Snapshot::new(posts),
        post: updated,
    })
}

fn fresh_id<F>(ids: &mut dyn IdGenerator, taken: F) -> ForumResult<String>
where
    F: Fn(&str) -> bool,
{
    for _ in 0..MAX_ID_ATTEMPTS {
        let candidate = ids.next_id();
        if !is_blank(&candidate) && !taken(&candidate) {
            return Ok(candidate);
        }
    }
    Err(ForumError::validation(
        "id generator did not produce an unused id",
    ))
}
