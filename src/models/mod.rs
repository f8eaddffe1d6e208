use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashSet;

/// Number of items per page for all paginated list endpoints
pub const PAGE_SIZE: usize = 10;

/// Public display fields for a user, embedded in posts and comments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// Full public profile, including the denormalized follow counters
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub total_followers: i64,
    pub total_following: i64,
}

/// A post row as stored, without author display fields
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub steps: Option<Vec<String>>,
    pub main_image: Option<String>,
    pub total_like: i64,
    pub total_comment: i64,
    pub total_view: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Flat post+author row produced by the posts/users join
///
/// Author columns are aliased `author_*` in queries; `From` conversions below
/// reassemble the nested response shapes.
#[derive(Debug, Clone, FromRow)]
pub struct PostAuthorRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub steps: Option<Vec<String>>,
    pub main_image: Option<String>,
    pub total_like: i64,
    pub total_comment: i64,
    pub total_view: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

impl PostAuthorRow {
    fn author(&self) -> UserSummary {
        UserSummary {
            id: self.author_id,
            username: self.author_username.clone(),
            name: self.author_name.clone(),
            avatar: self.author_avatar.clone(),
        }
    }
}

/// Feed/list representation of a post: counters and author, no steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub author: UserSummary,
    pub title: String,
    pub description: String,
    pub main_image: Option<String>,
    pub total_like: i64,
    pub total_comment: i64,
    pub total_view: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostAuthorRow> for PostSummary {
    fn from(row: PostAuthorRow) -> Self {
        let author = row.author();
        PostSummary {
            id: row.id,
            author,
            title: row.title,
            description: row.description,
            main_image: row.main_image,
            total_like: row.total_like,
            total_comment: row.total_comment,
            total_view: row.total_view,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Detail representation of a post, including the recipe-style steps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i64,
    pub author: UserSummary,
    pub title: String,
    pub description: String,
    pub steps: Option<Vec<String>>,
    pub main_image: Option<String>,
    pub total_like: i64,
    pub total_comment: i64,
    pub total_view: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostAuthorRow> for PostDetail {
    fn from(row: PostAuthorRow) -> Self {
        let author = row.author();
        PostDetail {
            id: row.id,
            author,
            title: row.title,
            description: row.description,
            steps: row.steps,
            main_image: row.main_image,
            total_like: row.total_like,
            total_comment: row.total_comment,
            total_view: row.total_view,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Flat comment+author row from the comments/users join
#[derive(Debug, Clone, FromRow)]
pub struct CommentAuthorRow {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub author_name: String,
    pub author_avatar: Option<String>,
}

/// A comment with its author's display fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: UserSummary,
}

impl From<CommentAuthorRow> for CommentView {
    fn from(row: CommentAuthorRow) -> Self {
        CommentView {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            user: UserSummary {
                id: row.author_id,
                username: row.author_username,
                name: row.author_name,
                avatar: row.author_avatar,
            },
        }
    }
}

/// Viewer row plus the set of post ids already surfaced in their feed
#[derive(Debug, Clone)]
pub struct ViewerSnapshot {
    pub viewer: UserSummary,
    pub viewed_posts: HashSet<i64>,
}

// Request payloads

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub description: String,
    pub steps: Option<Vec<String>>,
    pub main_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps: Option<Vec<String>>,
    pub main_image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

/// One page of a list endpoint
///
/// `next_page` mirrors the client contract: true when the underlying list
/// extends beyond this page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page: bool,
}

/// Slices a fully materialized list into the requested 1-based page
pub fn paginate<T>(items: Vec<T>, page: u32) -> Page<T> {
    let page = page.max(1) as usize;
    let total = items.len();
    let start = (page - 1) * PAGE_SIZE;

    let page_items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .collect();

    Page {
        items: page_items,
        next_page: total > PAGE_SIZE * page,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64) -> PostAuthorRow {
        PostAuthorRow {
            id,
            title: "Midnight ramen".to_string(),
            description: "Better than it has any right to be".to_string(),
            steps: Some(vec!["boil".to_string(), "slurp".to_string()]),
            main_image: None,
            total_like: 3,
            total_comment: 1,
            total_view: 12,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            author_id: 7,
            author_username: "mai".to_string(),
            author_name: "Mai".to_string(),
            author_avatar: Some("https://cdn.example/a.png".to_string()),
        }
    }

    #[test]
    fn test_post_summary_from_row() {
        let summary = PostSummary::from(row(42));
        assert_eq!(summary.id, 42);
        assert_eq!(summary.author.id, 7);
        assert_eq!(summary.author.username, "mai");
        assert_eq!(summary.total_like, 3);
    }

    #[test]
    fn test_post_detail_keeps_steps() {
        let detail = PostDetail::from(row(1));
        assert_eq!(detail.steps.as_deref(), Some(&["boil".to_string(), "slurp".to_string()][..]));
    }

    #[test]
    fn test_paginate_first_page() {
        let page = paginate((0..25).collect::<Vec<_>>(), 1);
        assert_eq!(page.items, (0..10).collect::<Vec<_>>());
        assert!(page.next_page);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let page = paginate((0..25).collect::<Vec<_>>(), 3);
        assert_eq!(page.items, (20..25).collect::<Vec<_>>());
        assert!(!page.next_page);
    }

    #[test]
    fn test_paginate_exact_boundary() {
        // 20 items fill page 2 exactly; there is no page 3
        let page = paginate((0..20).collect::<Vec<_>>(), 2);
        assert_eq!(page.items.len(), 10);
        assert!(!page.next_page);
    }

    #[test]
    fn test_paginate_past_the_end() {
        let page = paginate(vec![1, 2, 3], 5);
        assert!(page.items.is_empty());
        assert!(!page.next_page);
    }

    #[test]
    fn test_paginate_clamps_page_zero() {
        let page = paginate((0..5).collect::<Vec<_>>(), 0);
        assert_eq!(page.items.len(), 5);
        assert!(!page.next_page);
    }
}
