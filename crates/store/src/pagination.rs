//! Cursor pagination primitive.
//!
//! Canonical sort order for every cursor-paginated record set:
//! `created_at` descending, ties broken by `id` ascending. A cursor encodes
//! the sort key of the last row of the previous page as an opaque token
//! (base64 of `"{created_at}::{id}"`). Resuming takes the first row
//! strictly after the cursor; a cursor whose boundary row has since been
//! pruned simply yields an empty page.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use dexsocial_common::{AppError, AppResult};

/// A record set that can be cursor-paginated.
pub trait Chronological {
    /// Primary sort key (descending).
    fn created_at(&self) -> DateTime<Utc>;
    /// Tiebreak sort key (ascending).
    fn sort_id(&self) -> &str;
}

/// Decoded continuation point: the sort key of the last row already seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    /// `created_at` of the boundary row.
    pub created_at: DateTime<Utc>,
    /// `id` of the boundary row.
    pub id: String,
}

impl Cursor {
    /// Build a cursor pointing at a row.
    pub fn for_row<T: Chronological>(row: &T) -> Self {
        Self {
            created_at: row.created_at(),
            id: row.sort_id().to_string(),
        }
    }

    /// Encode as an opaque token.
    #[must_use]
    pub fn encode(&self) -> String {
        BASE64.encode(format!("{}::{}", self.created_at.to_rfc3339(), self.id))
    }

    /// Decode an opaque token. A token that is not base64 of
    /// `"{rfc3339}::{id}"` is a validation error; a token pointing at a
    /// row that no longer exists is not.
    pub fn decode(token: &str) -> AppResult<Self> {
        let raw = BASE64
            .decode(token)
            .map_err(|_| AppError::Validation("Malformed cursor".to_string()))?;
        let raw = String::from_utf8(raw)
            .map_err(|_| AppError::Validation("Malformed cursor".to_string()))?;

        let (ts, id) = raw
            .split_once("::")
            .ok_or_else(|| AppError::Validation("Malformed cursor".to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(ts)
            .map_err(|_| AppError::Validation("Malformed cursor".to_string()))?
            .with_timezone(&Utc);

        Ok(Self {
            created_at,
            id: id.to_string(),
        })
    }
}

/// One page of a cursor-paginated record set.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Rows in canonical order.
    pub items: Vec<T>,
    /// Token to resume from, present only when rows remain beyond this page.
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// An empty terminal page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }

    /// Map the items, keeping the continuation token.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

/// Sort rows into canonical order: `created_at` desc, `id` asc.
pub fn sort_rows<T: Chronological>(rows: &mut [T]) {
    rows.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.sort_id().cmp(b.sort_id()))
    });
}

/// Whether `row` comes strictly after `cursor` in canonical order.
fn is_after<T: Chronological>(row: &T, cursor: &Cursor) -> bool {
    row.created_at() < cursor.created_at
        || (row.created_at() == cursor.created_at && row.sort_id() > cursor.id.as_str())
}

/// Paginate a full record set. `rows` need not be pre-sorted.
pub fn paginate<T: Chronological>(mut rows: Vec<T>, cursor: Option<&Cursor>, limit: usize) -> Page<T> {
    sort_rows(&mut rows);

    let start = match cursor {
        None => 0,
        Some(c) => match rows.iter().position(|row| is_after(row, c)) {
            Some(pos) => pos,
            // Nothing after the boundary (or the boundary was pruned away
            // along with everything older): terminal empty page.
            None => return Page::empty(),
        },
    };

    let remaining = rows.len() - start;
    let items: Vec<T> = rows.drain(start..).take(limit).collect();
    let next_cursor = if remaining > limit {
        items.last().map(|row| Cursor::for_row(row).encode())
    } else {
        None
    };

    Page { items, next_cursor }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
        created_at: DateTime<Utc>,
    }

    impl Chronological for Row {
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }
        fn sort_id(&self) -> &str {
            &self.id
        }
    }

    fn row(id: &str, secs: i64) -> Row {
        Row {
            id: id.to_string(),
            created_at: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_cursor_round_trip() {
        let cursor = Cursor::for_row(&row("abc", 42));
        let decoded = Cursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_malformed_cursor_is_validation_error() {
        assert!(matches!(
            Cursor::decode("not-base64!!!"),
            Err(AppError::Validation(_))
        ));
        let garbage = BASE64.encode("no-separator-here");
        assert!(matches!(
            Cursor::decode(&garbage),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_sort_order_desc_with_id_tiebreak() {
        let mut rows = vec![row("b", 10), row("a", 10), row("c", 20)];
        sort_rows(&mut rows);
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_pages_concatenate_without_gaps_or_duplicates() {
        let rows: Vec<Row> = (0..250).map(|i| row(&format!("id{i:03}"), i)).collect();

        let mut seen = Vec::new();
        let mut cursor: Option<Cursor> = None;
        loop {
            let page = paginate(rows.clone(), cursor.as_ref(), 20);
            seen.extend(page.items.iter().map(|r| r.id.clone()));
            match page.next_cursor {
                Some(token) => cursor = Some(Cursor::decode(&token).unwrap()),
                None => break,
            }
        }

        assert_eq!(seen.len(), 250);
        let mut expected = rows;
        sort_rows(&mut expected);
        let expected_ids: Vec<String> = expected.into_iter().map(|r| r.id).collect();
        assert_eq!(seen, expected_ids);
    }

    #[test]
    fn test_pruned_boundary_row_yields_empty_page() {
        // Cursor points at the oldest row; after pruning it, nothing is
        // "strictly after" it.
        let rows: Vec<Row> = (1..10).map(|i| row(&format!("id{i}"), i)).collect();
        let pruned = row("id0", 0);
        let cursor = Cursor::for_row(&pruned);

        let page = paginate(rows, Some(&cursor), 5);
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_no_next_cursor_on_exact_boundary() {
        let rows: Vec<Row> = (0..20).map(|i| row(&format!("id{i:02}"), i)).collect();
        let page = paginate(rows, None, 20);
        assert_eq!(page.items.len(), 20);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_equal_timestamps_resume_by_id() {
        let rows = vec![row("a", 5), row("b", 5), row("c", 5), row("d", 5)];
        let first = paginate(rows.clone(), None, 2);
        let ids: Vec<&str> = first.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let cursor = Cursor::decode(&first.next_cursor.unwrap()).unwrap();
        let second = paginate(rows, Some(&cursor), 2);
        let ids: Vec<&str> = second.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d"]);
        assert!(second.next_cursor.is_none());
    }
}
