//! The seam between rendering code and the store.
//!
//! Widgets receive a [`Post`] they must treat as read-only, plus a
//! [`ViewAdapter`] to call back into. After a callback they re-render from
//! the post the adapter returns.

use crate::engine::Intent;
use crate::error::ForumResult;
use crate::model::Post;
use crate::store::ForumStore;
use std::collections::HashSet;

pub trait ViewAdapter {
    fn on_upvote(&mut self, post_id: &str) -> ForumResult<Post>;
    fn on_bookmark(&mut self, post_id: &str) -> ForumResult<Post>;
    fn on_like(&mut self, post_id: &str) -> ForumResult<Post>;
    fn on_comment(&mut self, post_id: &str, text: &str) -> ForumResult<Post>;

    /// Routes an intent produced by a widget to the matching callback.
    fn submit(&mut self, intent: Intent) -> ForumResult<Post>;
}

impl ViewAdapter for ForumStore {
    fn on_upvote(&mut self, post_id: &str) -> ForumResult<Post> {
        self.toggle_upvote(post_id)
    }

    fn on_bookmark(&mut self, post_id: &str) -> ForumResult<Post> {
        self.toggle_bookmark(post_id)
    }

    fn on_like(&mut self, post_id: &str) -> ForumResult<Post> {
        self.toggle_like(post_id)
    }

    fn on_comment(&mut self, post_id: &str, text: &str) -> ForumResult<Post> {
        self.add_comment(post_id, text)
    }

    fn submit(&mut self, intent: Intent) -> ForumResult<Post> {
        self.dispatch(intent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Upvote,
    Bookmark,
    Like,
}

impl Control {
    fn intent(self, post_id: &str) -> Intent {
        let post_id = post_id.to_string();
        match self {
            Control::Upvote => Intent::ToggleUpvote { post_id },
            Control::Bookmark => Intent::ToggleBookmark { post_id },
            Control::Like => Intent::ToggleLike { post_id },
        }
    }
}

/// Display state for one post: the copy being shown and which controls are
/// waiting on the store.
///
/// A pressed control stays disabled until [`PostCard::render`] is called
/// with the store's answer, so repeated presses from the same frame turn
/// into a single intent.
#[derive(Debug, Clone)]
pub struct PostCard {
    post: Post,
    pending: HashSet<Control>,
    comment_pending: bool,
}

impl PostCard {
    pub fn new(post: Post) -> Self {
        Self {
            post,
            pending: HashSet::new(),
            comment_pending: false,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        !self.pending.contains(&control)
    }

    /// Returns the intent for an enabled control and disables it; a disabled
    /// control yields `None`.
    pub fn press(&mut self, control: Control) -> Option<Intent> {
        if !self.pending.insert(control) {
            tracing::debug!(post_id = %self.post.id, ?control, "ignoring repeated press");
            return None;
        }
        Some(control.intent(&self.post.id))
    }

    /// Same as [`PostCard::press`] for the comment form.
    pub fn submit_comment(&mut self, text: &str) -> Option<Intent> {
        if self.comment_pending {
            return None;
        }
        self.comment_pending = true;
        Some(Intent::AddComment {
            post_id: self.post.id.clone(),
            text: text.to_string(),
        })
    }

    /// Replaces the shown post with the store's answer and re-enables every
    /// control.
    pub fn render(&mut self, post: Post) {
        self.post = post;
        self.release();
    }

    /// Re-enables controls without a new post, after a rejected intent.
    pub fn release(&mut self) {
        self.pending.clear();
        self.comment_pending = false;
    }

    /// Press, submit and re-render in one step. Returns `Ok(false)` when the
    /// press was debounced.
    pub fn click<A>(&mut self, control: Control, adapter: &mut A) -> ForumResult<bool>
    where
        A: ViewAdapter + ?Sized,
    {
        let Some(intent) = self.press(control) else {
            return Ok(false);
        };
        self.settle(adapter.submit(intent))
    }

    pub fn comment<A>(&mut self, text: &str, adapter: &mut A) -> ForumResult<bool>
    where
        A: ViewAdapter + ?Sized,
    {
        let Some(intent) = self.submit_comment(text) else {
            return Ok(false);
        };
        self.settle(adapter.submit(intent))
    }

    fn settle(&mut self, outcome: ForumResult<Post>) -> ForumResult<bool> {
        match outcome {
            Ok(post) => {
                self.render(post);
                Ok(true)
            }
            Err(err) => {
                self.release();
                Err(err)
            }
        }
    }
}
