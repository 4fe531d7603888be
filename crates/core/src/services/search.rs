//! Friend search.
//!
//! The user population is small enough to scan in memory, so search is a
//! linear pass over the directory with a tiered fuzzy score. Users in a
//! block relation with the searcher, in either direction, never appear.

use std::sync::Arc;

use dexsocial_common::AppResult;
use dexsocial_store::repositories::BlockRepository;

use crate::directory::{SocialUser, UserDirectory};
use crate::views::FriendCandidateView;

/// Score tiers. Within a tier, penalties order closer matches first; the
/// gaps between tiers are wide enough that no penalty demotes a match
/// into a lower tier.
const EXACT_SCORE: i64 = 1000;
const PREFIX_SCORE: i64 = 800;
const SUBSTRING_SCORE: i64 = 600;
const SUBSEQUENCE_SCORE: i64 = 300;

/// Fuzzy friend search over the user directory.
#[derive(Clone)]
pub struct FriendSearchService {
    directory: Arc<dyn UserDirectory>,
    block_repo: BlockRepository,
}

impl FriendSearchService {
    /// Create a new search service.
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>, block_repo: BlockRepository) -> Self {
        Self {
            directory,
            block_repo,
        }
    }

    /// Ranked candidates matching `query`, excluding the searcher and any
    /// user in a block relation with them.
    pub async fn search(
        &self,
        searcher: &str,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<FriendCandidateView>> {
        let query = normalize(query);
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let users = self.directory.list_all_users().await?;
        let blocked = self.block_repo.list_blocked_ids_for_viewer(searcher).await?;

        let mut scored: Vec<(i64, chrono::DateTime<chrono::Utc>, FriendCandidateView)> = Vec::new();
        for user in users {
            if user.id == searcher || blocked.contains(&user.id) {
                continue;
            }
            let Some(score) = score_candidate(&user, &query) else {
                continue;
            };
            let profile = self.directory.get_profile(&user.id).await?;
            scored.push((
                score,
                user.updated_at,
                FriendCandidateView {
                    user_id: user.id,
                    name: user.name,
                    avatar_url: profile.and_then(|p| p.avatar_url),
                    score,
                },
            ));
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, _, view)| view)
            .collect())
    }
}

/// Best score across the candidate's name fields: the display name and,
/// when present, the local part of the email address.
fn score_candidate(user: &SocialUser, query: &str) -> Option<i64> {
    let name_score = score_match(&normalize(&user.name), query);
    let email_score = user
        .email
        .as_deref()
        .and_then(|e| e.split('@').next())
        .and_then(|local| score_match(&normalize(local), query));
    match (name_score, email_score) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, b) => a.or(b),
    }
}

/// Lowercase and strip common Latin diacritics ("Pokémon" matches
/// "pokemon").
fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(fold_diacritic)
        .collect()
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => c,
    }
}

/// Tiered fuzzy score of a normalized name against a normalized query, or
/// `None` when the query is not even a subsequence of the name.
fn score_match(name: &str, query: &str) -> Option<i64> {
    if name == query {
        return Some(EXACT_SCORE);
    }
    if name.starts_with(query) {
        let diff = name.chars().count().abs_diff(query.chars().count());
        let score = PREFIX_SCORE - i64::try_from(diff).unwrap_or(i64::MAX);
        // A penalty that eats the whole tier means no match at all.
        return (score > 0).then_some(score);
    }
    if let Some(index) = name.find(query) {
        let char_index = name[..index].chars().count();
        let score = SUBSTRING_SCORE - i64::try_from(char_index).unwrap_or(i64::MAX);
        return (score > 0).then_some(score);
    }
    subsequence_score(name, query)
}

/// Subsequence tier: every query char must appear in the name in order.
/// Consecutive hits build a streak, and each hit adds the current streak
/// length, so contiguous runs outrank scattered ones.
fn subsequence_score(name: &str, query: &str) -> Option<i64> {
    let mut query_chars = query.chars().peekable();
    let mut score = SUBSEQUENCE_SCORE;
    let mut streak = 0i64;

    for c in name.chars() {
        match query_chars.peek() {
            Some(&next) if next == c => {
                query_chars.next();
                streak += 1;
                score += streak;
            }
            Some(_) => streak = 0,
            None => break,
        }
    }

    if query_chars.peek().is_none() {
        Some(score)
    } else {
        None
    }
}
