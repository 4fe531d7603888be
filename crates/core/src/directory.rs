//! User/profile lookup collaborator.
//!
//! The engine does not own user accounts or profiles; it consumes them
//! through [`UserDirectory`]. The web application wires its own
//! implementation; [`MemoryDirectory`] backs tests and the demo server.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dexsocial_common::AppResult;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// A user account as the directory exposes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialUser {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Profile visibility as the profile editor stores it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
}

/// A user profile as the directory exposes it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub visibility: ProfileVisibility,
    pub show_favorites_on_public: bool,
}

/// User/profile lookup service consumed by the engine.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up a user by id.
    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<SocialUser>>;

    /// Look up a user's profile by id.
    async fn get_profile(&self, id: &str) -> AppResult<Option<SocialProfile>>;

    /// Every known user. Friend search scans this in memory.
    async fn list_all_users(&self) -> AppResult<Vec<SocialUser>>;
}

/// In-memory directory for tests and the demo server.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<String, SocialUser>>,
    profiles: RwLock<HashMap<String, SocialProfile>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directory already wrapped for sharing.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Insert or replace a user.
    pub async fn insert_user(&self, user: SocialUser) {
        self.users.write().await.insert(user.id.clone(), user);
    }

    /// Insert or replace a user's profile.
    pub async fn insert_profile(&self, user_id: &str, profile: SocialProfile) {
        self.profiles.write().await.insert(user_id.to_string(), profile);
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_user_by_id(&self, id: &str) -> AppResult<Option<SocialUser>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn get_profile(&self, id: &str) -> AppResult<Option<SocialProfile>> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn list_all_users(&self) -> AppResult<Vec<SocialUser>> {
        Ok(self.users.read().await.values().cloned().collect())
    }
}

/// Build a user for tests and seeding.
#[must_use]
pub fn test_user(id: &str, name: &str) -> SocialUser {
    SocialUser {
        id: id.to_string(),
        name: name.to_string(),
        email: Some(format!("{id}@example.com")),
        image: None,
        updated_at: Utc::now(),
    }
}
