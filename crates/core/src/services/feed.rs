//! Activity feed service.
//!
//! The raw log is shared; what a viewer sees is filtered per request
//! against their friend set, their block relations, and each actor's
//! live profile settings. Because filtering happens after pagination,
//! pages are assembled by over-fetching raw rows until the requested
//! number of surfaced rows is reached.

use std::collections::HashSet;
use std::sync::Arc;

use dexsocial_common::AppResult;
use dexsocial_store::pagination::{Cursor, Page};
use dexsocial_store::records::{ActivityKind, FavoriteRef, SocialActivityRecord};
use dexsocial_store::repositories::{ActivityRepository, BlockRepository, FriendshipRepository};

use crate::directory::UserDirectory;
use crate::views::SocialActivityView;

/// Raw rows fetched per iteration while assembling one surfaced page.
const RAW_FETCH_SIZE: usize = 100;

/// Feed service for recording and reading activity.
#[derive(Clone)]
pub struct FeedService {
    activity_repo: ActivityRepository,
    friendship_repo: FriendshipRepository,
    block_repo: BlockRepository,
    directory: Arc<dyn UserDirectory>,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub fn new(
        activity_repo: ActivityRepository,
        friendship_repo: FriendshipRepository,
        block_repo: BlockRepository,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            activity_repo,
            friendship_repo,
            block_repo,
            directory,
        }
    }

    /// Record that a user favorited an entity.
    pub async fn record_favorite(
        &self,
        actor: &str,
        favorite: FavoriteRef,
    ) -> AppResult<SocialActivityRecord> {
        self.activity_repo
            .append(ActivityKind::FavoriteAdded, actor, None, Some(favorite))
            .await
    }

    /// One page of the viewer's feed, newest first.
    ///
    /// The cursor names the last surfaced row, so a resume re-scans any
    /// masked rows after it; they are filtered out again, which keeps
    /// resumption stable even when visibility changed between pages.
    pub async fn list_for_viewer(
        &self,
        viewer: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> AppResult<Page<SocialActivityView>> {
        let mut cursor = cursor.map(Cursor::decode).transpose()?;

        let friendships = self.friendship_repo.list_accepted_for_user(viewer).await?;
        let blocked = self.block_repo.list_blocked_ids_for_viewer(viewer).await?;
        let mut visible: HashSet<String> = friendships
            .iter()
            .filter_map(|f| f.other_party(viewer))
            .filter(|id| !blocked.contains(*id))
            .map(ToString::to_string)
            .collect();
        visible.insert(viewer.to_string());

        let mut items: Vec<SocialActivityView> = Vec::new();
        let mut next_cursor = None;

        'pages: loop {
            let raw = self
                .activity_repo
                .list_page(cursor.as_ref(), RAW_FETCH_SIZE)
                .await?;
            let raw_len = raw.items.len();

            for (pos, record) in raw.items.iter().enumerate() {
                if !self.surfaces(viewer, record, &visible, &blocked).await? {
                    continue;
                }
                items.push(self.to_view(record).await?);
                if items.len() >= limit {
                    let more_raw = pos + 1 < raw_len || raw.next_cursor.is_some();
                    if more_raw {
                        next_cursor = Some(Cursor::for_row(record).encode());
                    }
                    break 'pages;
                }
            }

            match raw.next_cursor {
                Some(token) => cursor = Some(Cursor::decode(&token)?),
                None => break,
            }
        }

        Ok(Page { items, next_cursor })
    }

    /// Whether one raw row is visible to the viewer.
    async fn surfaces(
        &self,
        viewer: &str,
        record: &SocialActivityRecord,
        visible: &HashSet<String>,
        blocked: &HashSet<String>,
    ) -> AppResult<bool> {
        if !visible.contains(&record.actor_user_id) {
            return Ok(false);
        }
        if let Some(target) = &record.target_user_id {
            if blocked.contains(target) {
                return Ok(false);
            }
        }
        // Favorite rows honor the actor's current profile setting, not the
        // setting at write time. The viewer always sees their own rows.
        if record.kind == ActivityKind::FavoriteAdded && record.actor_user_id != viewer {
            let profile = self.directory.get_profile(&record.actor_user_id).await?;
            if profile.is_some_and(|p| !p.show_favorites_on_public) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn to_view(&self, record: &SocialActivityRecord) -> AppResult<SocialActivityView> {
        let user = self.directory.find_user_by_id(&record.actor_user_id).await?;
        let profile = self.directory.get_profile(&record.actor_user_id).await?;
        let actor_name = profile
            .as_ref()
            .and_then(|p| p.display_name.clone())
            .or_else(|| user.map(|u| u.name))
            .unwrap_or_else(|| record.actor_user_id.clone());
        Ok(SocialActivityView {
            id: record.id.clone(),
            kind: record.kind,
            actor_user_id: record.actor_user_id.clone(),
            actor_name,
            actor_avatar_url: profile.and_then(|p| p.avatar_url),
            target_user_id: record.target_user_id.clone(),
            favorite: record.favorite.clone(),
            created_at: record.created_at,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::{MemoryDirectory, ProfileVisibility, SocialProfile, test_user};
    use dexsocial_store::test_utils::memory_store;

    struct Fixture {
        feed: FeedService,
        friendship_repo: FriendshipRepository,
        block_repo: BlockRepository,
        directory: Arc<MemoryDirectory>,
    }

    async fn fixture() -> Fixture {
        let store = memory_store();
        let directory = MemoryDirectory::shared();
        for (id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol")] {
            directory.insert_user(test_user(id, name)).await;
        }
        let friendship_repo = FriendshipRepository::new(store.clone());
        let block_repo = BlockRepository::new(store.clone());
        let feed = FeedService::new(
            ActivityRepository::new(store.clone()),
            friendship_repo.clone(),
            block_repo.clone(),
            directory.clone(),
        );
        Fixture {
            feed,
            friendship_repo,
            block_repo,
            directory,
        }
    }

    async fn befriend(f: &Fixture, a: &str, b: &str) {
        let (record, _) = f.friendship_repo.request_friendship(a, b).await.unwrap();
        f.friendship_repo.accept_incoming(b, &record.id).await.unwrap();
    }

    fn favorite(id: &str) -> FavoriteRef {
        FavoriteRef {
            entity_type: "pokemon".to_string(),
            entity_id: id.to_string(),
            title: id.to_string(),
            href: format!("/pokemon/{id}"),
        }
    }

    #[tokio::test]
    async fn test_feed_shows_own_and_friend_rows_only() {
        let f = fixture().await;
        befriend(&f, "alice", "bob").await;

        f.feed.record_favorite("alice", favorite("pikachu")).await.unwrap();
        f.feed.record_favorite("bob", favorite("eevee")).await.unwrap();
        f.feed.record_favorite("carol", favorite("mew")).await.unwrap();

        let page = f.feed.list_for_viewer("alice", None, 10).await.unwrap();
        let actors: Vec<&str> = page.items.iter().map(|i| i.actor_user_id.as_str()).collect();
        assert_eq!(actors, vec!["bob", "alice"]);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_block_hides_rows_even_with_stale_friendship() {
        let f = fixture().await;
        befriend(&f, "alice", "bob").await;
        f.feed.record_favorite("bob", favorite("eevee")).await.unwrap();

        // Block directly at the repository so the friendship row survives.
        f.block_repo.block("bob", "alice").await.unwrap();

        let page = f.feed.list_for_viewer("alice", None, 10).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_favorite_rows_honor_live_profile_setting() {
        let f = fixture().await;
        befriend(&f, "alice", "bob").await;
        f.feed.record_favorite("bob", favorite("eevee")).await.unwrap();

        f.directory
            .insert_profile(
                "bob",
                SocialProfile {
                    display_name: None,
                    avatar_url: None,
                    bio: None,
                    visibility: ProfileVisibility::Public,
                    show_favorites_on_public: false,
                },
            )
            .await;

        let page = f.feed.list_for_viewer("alice", None, 10).await.unwrap();
        assert!(page.items.is_empty());

        // Bob still sees his own favorite.
        let page = f.feed.list_for_viewer("bob", None, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_filtered_pages_fill_to_limit() {
        let f = fixture().await;
        befriend(&f, "alice", "bob").await;

        // Interleave visible and masked rows.
        for i in 0..30 {
            let actor = if i % 2 == 0 { "bob" } else { "carol" };
            f.feed.record_favorite(actor, favorite(&format!("mon{i}"))).await.unwrap();
        }

        let page = f.feed.list_for_viewer("alice", None, 10).await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert!(page.items.iter().all(|i| i.actor_user_id == "bob"));
        assert!(page.next_cursor.is_some());

        let rest = f
            .feed
            .list_for_viewer("alice", page.next_cursor.as_deref(), 10)
            .await
            .unwrap();
        assert_eq!(rest.items.len(), 5);
        assert!(rest.next_cursor.is_none());

        // No overlap between pages.
        let first: Vec<&str> = page.items.iter().map(|i| i.id.as_str()).collect();
        assert!(rest.items.iter().all(|i| !first.contains(&i.id.as_str())));
    }

    #[tokio::test]
    async fn test_exact_fit_page_has_no_cursor() {
        let f = fixture().await;
        for i in 0..5 {
            f.feed.record_favorite("alice", favorite(&format!("mon{i}"))).await.unwrap();
        }

        let page = f.feed.list_for_viewer("alice", None, 5).await.unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_friendship_rows_render_actor_names() {
        let f = fixture().await;
        befriend(&f, "alice", "bob").await;
        f.feed.record_favorite("bob", favorite("eevee")).await.unwrap();

        let page = f.feed.list_for_viewer("alice", None, 10).await.unwrap();
        assert_eq!(page.items[0].actor_name, "Bob");
        assert_eq!(page.items[0].favorite.as_ref().unwrap().entity_id, "eevee");
    }
}
