pub mod comments;
pub mod favorites;
pub mod feed;
pub mod follows;
pub mod likes;
pub mod posts;
pub mod store;
