//! Forum entities and their shape checks.
//!
//! Field names serialize in the camelCase shape used by the front end's
//! seed arrays so existing seed files load without translation.

use crate::error::{ForumError, ForumResult};
use crate::utils::is_blank;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author embedded by value in posts and comments. Nothing keeps it in sync
/// with the [`User`] it was copied from.
///
/// Comment authors in front-end data carry no id, so `id` may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub avatar: String,
}

impl AuthorRef {
    pub fn validate(&self) -> ForumResult<()> {
        if is_blank(&self.username) {
            return Err(ForumError::validation("author username may not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: AuthorRef,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn validate(&self) -> ForumResult<()> {
        if is_blank(&self.id) {
            return Err(ForumError::validation("comment id may not be empty"));
        }
        if is_blank(&self.content) {
            return Err(ForumError::validation(format!(
                "comment {} has empty content",
                self.id
            )));
        }
        self.author.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub author: AuthorRef,
    pub created_at: DateTime<Utc>,
    pub upvotes: u32,
    #[serde(default)]
    pub is_upvoted: bool,
    pub category: String,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub is_liked: bool,
    /// `None` when only the count is known for this post.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments_list: Option<Vec<Comment>>,
}

/// Author-supplied fields of a new post. Everything else is filled in by
/// [`Post::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image: None,
            category: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn validate(&self) -> ForumResult<()> {
        validate_post_text(&self.title, &self.content)
    }
}

/// The editable subset of a post: title, content and image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostEdit {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
}

pub const DEFAULT_CATEGORY: &str = "General";

impl Post {
    /// Builds a fresh post with zeroed counters and cleared viewer flags.
    /// `default_image` is used when the draft carries no image.
    pub fn new(
        id: String,
        draft: PostDraft,
        author: AuthorRef,
        now: DateTime<Utc>,
        default_image: Option<&str>,
    ) -> ForumResult<Self> {
        validate_post_text(&draft.title, &draft.content)?;
        let image = draft
            .image
            .filter(|image| !is_blank(image))
            .or_else(|| default_image.map(str::to_string));
        let category = draft
            .category
            .filter(|category| !is_blank(category))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        Ok(Self {
            id,
            title: draft.title,
            content: draft.content,
            image,
            author,
            created_at: now,
            upvotes: 0,
            is_upvoted: false,
            category,
            comments: 0,
            is_bookmarked: false,
            is_liked: false,
            comments_list: Some(Vec::new()),
        })
    }

    pub fn validate(&self) -> ForumResult<()> {
        if is_blank(&self.id) {
            return Err(ForumError::validation("post id may not be empty"));
        }
        validate_post_text(&self.title, &self.content).map_err(|err| match err {
            ForumError::Validation(msg) => ForumError::validation(format!("post {}: {msg}", self.id)),
            other => other,
        })?;
        self.author.validate()?;
        if self.is_upvoted && self.upvotes == 0 {
            return Err(ForumError::validation(format!(
                "post {} is upvoted by the viewer but has zero upvotes",
                self.id
            )));
        }
        if let Some(list) = &self.comments_list {
            if list.len() != self.comments as usize {
                return Err(ForumError::validation(format!(
                    "post {} counts {} comments but lists {}",
                    self.id,
                    self.comments,
                    list.len()
                )));
            }
            for comment in list {
                comment.validate()?;
            }
        }
        Ok(())
    }

    /// Whether individual comments are known for this post, not just the count.
    pub fn tracks_comments(&self) -> bool {
        self.comments_list.is_some()
    }
}

fn validate_post_text(title: &str, content: &str) -> ForumResult<()> {
    if is_blank(title) {
        return Err(ForumError::validation("post title may not be empty"));
    }
    if is_blank(content) {
        return Err(ForumError::validation("post content may not be empty"));
    }
    Ok(())
}

impl PostEdit {
    pub fn validate(&self) -> ForumResult<()> {
        validate_post_text(&self.title, &self.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display only; never recomputed from the posts.
    #[serde(default)]
    pub thread_count: u32,
    #[serde(default)]
    pub is_trending: bool,
}

impl Category {
    pub fn validate(&self) -> ForumResult<()> {
        if is_blank(&self.id) {
            return Err(ForumError::validation("category id may not be empty"));
        }
        if is_blank(&self.name) {
            return Err(ForumError::validation(format!(
                "category {} has an empty name",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub total_upvotes: u32,
    #[serde(default)]
    pub threads_created: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<SocialLinks>,
}

/// Fields the profile form may change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub bio: String,
    pub avatar: String,
}

impl User {
    pub fn validate(&self) -> ForumResult<()> {
        if is_blank(&self.id) {
            return Err(ForumError::validation("user id may not be empty"));
        }
        if is_blank(&self.username) {
            return Err(ForumError::validation("username may not be empty"));
        }
        Ok(())
    }

    /// The by-value reference embedded into content this user creates.
    pub fn author_ref(&self) -> AuthorRef {
        AuthorRef {
            id: self.id.clone(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }

    /// Applies a profile edit, leaving the display counters untouched.
    pub fn with_profile(&self, update: ProfileUpdate) -> ForumResult<Self> {
        let updated = Self {
            username: update.username.trim().to_string(),
            bio: update.bio,
            avatar: update.avatar,
            ..self.clone()
        };
        updated.validate()?;
        Ok(updated)
    }
}
