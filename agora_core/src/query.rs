//! Read-only projections over posts and categories.

use crate::error::{ForumError, ForumResult};
use crate::model::{Category, Post};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const ALL_CATEGORIES: &str = "all";

/// Which posts a listing shows. Parsed from the `"all"` sentinel or a
/// category label.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Label(String),
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Label(trimmed.to_string())
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Label(label) => post.category.to_lowercase() == label.to_lowercase(),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Latest,
    Popular,
}

impl FromStr for SortMode {
    type Err = ForumError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "latest" => Ok(SortMode::Latest),
            "popular" => Ok(SortMode::Popular),
            other => Err(ForumError::validation(format!(
                "unknown sort mode '{other}', expected 'latest' or 'popular'"
            ))),
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Latest => f.write_str("latest"),
            SortMode::Popular => f.write_str("popular"),
        }
    }
}

pub fn filter_by_category<'a>(posts: &'a [Post], filter: &CategoryFilter) -> Vec<&'a Post> {
    posts.iter().filter(|post| filter.matches(post)).collect()
}

/// Stable sort, so ties keep their collection order.
pub fn sort_posts(posts: &mut [&Post], mode: SortMode) {
    match mode {
        SortMode::Latest => posts.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortMode::Popular => posts.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
    }
}

pub fn search_categories<'a>(categories: &'a [Category], query: &str) -> Vec<&'a Category> {
    let needle = query.trim().to_lowercase();
    categories
        .iter()
        .filter(|category| category.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn trending_categories(categories: &[Category]) -> Vec<&Category> {
    categories
        .iter()
        .filter(|category| category.is_trending)
        .collect()
}

/// Case-insensitive substring match on title or content. An empty query
/// matches nothing.
pub fn search_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    posts
        .iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&needle)
                || post.content.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn bookmarked(posts: &[Post]) -> Vec<&Post> {
    posts.iter().filter(|post| post.is_bookmarked).collect()
}

pub fn authored_by<'a>(posts: &'a [Post], user_id: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|post| post.author.id == user_id)
        .collect()
}

/// Posts whose label matches the name of the category with `category_id`.
pub fn posts_in_category<'a>(
    posts: &'a [Post],
    categories: &[Category],
    category_id: &str,
) -> ForumResult<Vec<&'a Post>> {
    let category = categories
        .iter()
        .find(|category| category.id == category_id)
        .ok_or_else(|| ForumError::category_not_found(category_id))?;
    Ok(filter_by_category(
        posts,
        &CategoryFilter::Label(category.name.clone()),
    ))
}
