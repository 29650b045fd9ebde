//! Row and result types shared between the store and the search providers.

use serde::Serialize;

/// One display entry in a search result listing. Transient, built per
/// search call.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultEntry {
    pub thumbnail_url: String,

    pub title: String,

    pub subline: String,

    pub resource_url: String,

    pub icon: String,

    /// Whether the thumbnail is rendered as a circle (avatars) or a square.
    pub rounded: bool,
}

/// A page of search results with an offset cursor into the backend's
/// ordering. `cursor` is only meaningful while `is_paginated` is true.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub entries: Vec<SearchResultEntry>,

    pub is_paginated: bool,

    pub cursor: Option<u64>,
}

impl SearchResults {
    /// The defined result for a gated-off provider: nothing, not paginated.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
            is_paginated: false,
            cursor: None,
        }
    }

    /// Build a page from backend rows: more rows may exist exactly when the
    /// backend filled the requested window.
    #[must_use]
    pub fn page(entries: Vec<SearchResultEntry>, row_count: u64, limit: u64, offset: u64) -> Self {
        if row_count == limit {
            Self {
                entries,
                is_paginated: true,
                cursor: Some(offset + row_count),
            }
        } else {
            Self {
                entries,
                is_paginated: false,
                cursor: None,
            }
        }
    }
}

/// A raw object row returned by the property-index search, before parsing.
#[derive(Debug, Clone)]
pub struct ObjectSearchRow {
    pub object_id: i32,

    pub object_uri: String,

    /// URI of the collection (calendar or address book) holding the object.
    pub collection_uri: String,

    pub data: String,
}

/// Options for a principal-scoped property search.
#[derive(Debug, Clone, Default)]
pub struct ObjectSearchOptions {
    /// Restrict matches to objects of this component type (VEVENT/VTODO).
    pub component: Option<String>,

    /// Property names the term is matched against.
    pub properties: Vec<String>,

    /// Properties whose match must additionally come from a CN parameter
    /// (attendee/organizer display names rather than raw values).
    pub cn_only_properties: Vec<String>,

    pub limit: u64,

    pub offset: u64,

    /// Epoch-second lower bound on the object's last occurrence.
    pub since: Option<i64>,

    /// Epoch-second upper bound on the object's first occurrence.
    pub until: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str) -> SearchResultEntry {
        SearchResultEntry {
            thumbnail_url: String::new(),
            title: title.to_string(),
            subline: String::new(),
            resource_url: String::new(),
            icon: "icon-calendar-dark".to_string(),
            rounded: false,
        }
    }

    #[test]
    fn full_window_is_paginated_with_advanced_cursor() {
        let page = SearchResults::page(vec![entry("a"), entry("b")], 2, 2, 10);
        assert!(page.is_paginated);
        assert_eq!(page.cursor, Some(12));
    }

    #[test]
    fn short_window_is_exhausted() {
        let page = SearchResults::page(vec![entry("a")], 1, 5, 10);
        assert!(!page.is_paginated);
        assert_eq!(page.cursor, None);
    }

    #[test]
    fn empty_result_is_not_paginated() {
        let page = SearchResults::empty();
        assert!(page.entries.is_empty());
        assert!(!page.is_paginated);
        assert_eq!(page.cursor, None);
    }
}
