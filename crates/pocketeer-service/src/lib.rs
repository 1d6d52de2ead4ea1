pub mod auth;
pub mod bookmarks;
pub mod normalize;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthManager, AuthOutcome, AuthSettings};
pub use bookmarks::BookmarkCache;
