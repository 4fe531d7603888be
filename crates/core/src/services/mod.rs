//! Service layer.

pub mod feed;
pub mod moderation;
pub mod notification;
pub mod presence;
pub mod search;
pub mod social;

pub use feed::FeedService;
pub use moderation::ModerationService;
pub use notification::NotificationService;
pub use presence::PresenceService;
pub use search::FriendSearchService;
pub use social::{SocialService, derive_relation_status};
