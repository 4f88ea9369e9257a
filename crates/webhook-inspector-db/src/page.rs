//! Cursor pagination over time-ordered ids
//!
//! A page is fetched with `id < cursor ORDER BY id DESC LIMIT limit + 1`. The
//! extra row only tells us whether another page exists; it is dropped before
//! the page is returned. Because the cursor is a value rather than a position,
//! rows inserted after pagination started (which always carry larger ids) and
//! rows deleted behind the cursor cannot shift the remaining pages.

use crate::error::PageError;
use crate::id::RecordId;

/// Number of items per page, validated to `MIN..=MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(u64);

impl PageLimit {
    pub const MIN: u64 = 1;
    pub const MAX: u64 = 100;
    pub const DEFAULT: u64 = 20;

    pub fn new(limit: u64) -> Result<Self, PageError> {
        if (Self::MIN..=Self::MAX).contains(&limit) {
            Ok(Self(limit))
        } else {
            Err(PageError::LimitOutOfRange {
                limit,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Rows to request from storage: one more than the page size.
    pub fn fetch_size(&self) -> u64 {
        self.0 + 1
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<u64> for PageLimit {
    type Error = PageError;

    fn try_from(limit: u64) -> Result<Self, Self::Error> {
        Self::new(limit)
    }
}

/// Parameters for one page of the newest-first listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: PageLimit,
    /// Exclusive bound: only ids strictly less than this are returned.
    /// The id does not have to exist any more.
    pub cursor: Option<RecordId>,
}

impl PageRequest {
    pub fn first(limit: PageLimit) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }

    pub fn after(cursor: RecordId, limit: PageLimit) -> Self {
        Self {
            limit,
            cursor: Some(cursor),
        }
    }
}

/// One page of results plus the cursor for the next one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Build a page from up to `limit + 1` rows already sorted by id descending.
    ///
    /// When the surplus row is present it is discarded and the id of the last
    /// kept row becomes the next cursor.
    pub fn from_rows<F>(mut rows: Vec<T>, limit: PageLimit, cursor_of: F) -> Self
    where
        F: Fn(&T) -> String,
    {
        let limit = limit.get() as usize;
        let has_more = rows.len() > limit;

        if has_more {
            rows.truncate(limit);
        }

        let next_cursor = if has_more {
            rows.last().map(&cursor_of)
        } else {
            None
        };

        Self {
            items: rows,
            next_cursor,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}
