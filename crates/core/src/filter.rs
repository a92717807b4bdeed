//! Status-tab and search filtering over actions and log lines.
//!
//! All functions here are pure and borrow from the canonical list. The
//! combined [`derive_view`] always starts from the unfiltered input and
//! applies the tab and the search query together, so changing one never
//! discards the other.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Tab key that disables status filtering.
pub const TAB_ALL: &str = "all";

/// Rows per page in the action and log grids.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A closed set of status values with stable string keys.
pub trait StatusKey: Sized + PartialEq {
    /// Every recognised key, in tab order.
    const KEYS: &'static [&'static str];

    /// Map a recognised key to its status. Keys are case-sensitive.
    fn from_key(key: &str) -> Option<Self>;

    /// The wire string for this status.
    fn as_key(&self) -> &str;
}

/// A record that can be narrowed by status tab and search query.
pub trait Filterable {
    type Status: StatusKey;

    fn status(&self) -> &Self::Status;

    /// The field searched by the free-text query.
    fn search_text(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

/// A status tab selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tab<S> {
    All,
    Only(S),
}

impl<S> Default for Tab<S> {
    fn default() -> Self {
        Self::All
    }
}

impl<S: StatusKey> Tab<S> {
    /// Parse a tab key: `"all"` or one of the status keys.
    pub fn parse(key: &str) -> Result<Self, CoreError> {
        if key == TAB_ALL {
            return Ok(Self::All);
        }
        S::from_key(key).map(Self::Only).ok_or_else(|| {
            CoreError::Validation(format!(
                "Invalid tab '{key}'. Must be one of: {TAB_ALL}, {}",
                S::KEYS.join(", ")
            ))
        })
    }

    pub fn key(&self) -> &str {
        match self {
            Self::All => TAB_ALL,
            Self::Only(status) => status.as_key(),
        }
    }

    /// Whether a record with `status` belongs on this tab.
    pub fn matches(&self, status: &S) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl<S: StatusKey> FromStr for Tab<S> {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<S: StatusKey> fmt::Display for Tab<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Filter functions
// ---------------------------------------------------------------------------

/// Keep the items on the selected tab, in their original order.
pub fn filter_by_tab<'a, T: Filterable>(items: &'a [T], tab: &Tab<T::Status>) -> Vec<&'a T> {
    items.iter().filter(|item| tab.matches(item.status())).collect()
}

/// Keep the items whose `field` contains `query`, ignoring case.
///
/// An empty query keeps everything.
pub fn filter_by_search<'a, T, F>(items: &'a [T], query: &str, field: F) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| contains_ignore_case(field(item), &needle))
        .collect()
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    lowered_needle.is_empty() || haystack.to_lowercase().contains(lowered_needle)
}

/// The combined tab + search selection for one grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFilter<S> {
    pub tab: Tab<S>,
    pub query: String,
}

impl<S> Default for ViewFilter<S> {
    fn default() -> Self {
        Self {
            tab: Tab::All,
            query: String::new(),
        }
    }
}

impl<S: StatusKey> ViewFilter<S> {
    pub fn new(tab: Tab<S>, query: impl Into<String>) -> Self {
        Self {
            tab,
            query: query.into(),
        }
    }

    /// Whether this filter passes every record through.
    pub fn is_identity(&self) -> bool {
        self.tab == Tab::All && self.query.is_empty()
    }
}

/// Apply tab and search together (logical AND) to the canonical list.
pub fn derive_view<'a, T: Filterable>(items: &'a [T], filter: &ViewFilter<T::Status>) -> Vec<&'a T> {
    let needle = filter.query.to_lowercase();
    items
        .iter()
        .filter(|item| filter.tab.matches(item.status()))
        .filter(|item| contains_ignore_case(item.search_text(), &needle))
        .collect()
}

/// Slice one page out of `items`. Pages are zero-based; a page past the
/// end yields an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page.saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Number of pages needed to show `len` rows.
pub fn page_count(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}
