//! Core business logic for dexsocial: the social graph & activity engine.
//!
//! Services compose the store repositories into user-facing operations:
//! friendship lifecycle, blocking, presence visibility, privacy settings,
//! moderation reports, the activity feed, notifications, and friend
//! search. Services never touch the document store directly; every read
//! and write goes through a repository.

pub mod directory;
pub mod services;
pub mod views;

pub use directory::{MemoryDirectory, ProfileVisibility, SocialProfile, SocialUser, UserDirectory};
pub use services::*;
pub use views::*;
