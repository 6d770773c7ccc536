//! Filter schema registry
//!
//! Static catalog of every filter the query language understands. Both the
//! validator and the suggestion engine read from here; nothing else keeps
//! its own list of filter names or legal values.

use serde::Serialize;

/// Shape of the value a filter accepts
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text: `game:valorant`, `game:"league of legends"`
    String,
    /// Integer with comparison or interval: `votes:>50`, `duration:10..60`
    Range,
    /// ISO date or relative keyword: `after:2024-01-31`, `after:last_week`
    Date,
    /// One value out of a closed set: `sort:popular`
    Enum,
    /// Boolean membership: `is:featured`
    Flag,
}

/// Description of a single filter
#[derive(Debug, Clone, Serialize)]
pub struct FilterMeta {
    /// Canonical lower-case name
    pub name: &'static str,
    pub value_kind: ValueKind,
    /// Legal values for enum/flag filters, relative keywords for date filters
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub enum_values: &'static [&'static str],
    pub description: &'static str,
}

/// Relative keywords accepted by every date filter
pub const RELATIVE_DATES: &[&str] = &["today", "yesterday", "last_week", "last_month", "last_year"];

/// Comparison operators offered for range filters, in display order
pub const RANGE_OPERATORS: &[&str] = &[">", ">=", "<", "<=", ".."];

static FILTERS: &[FilterMeta] = &[
    FilterMeta {
        name: "game",
        value_kind: ValueKind::String,
        enum_values: &[],
        description: "Clips from a game",
    },
    FilterMeta {
        name: "creator",
        value_kind: ValueKind::String,
        enum_values: &[],
        description: "Clips clipped by a user",
    },
    FilterMeta {
        name: "broadcaster",
        value_kind: ValueKind::String,
        enum_values: &[],
        description: "Clips from a broadcaster's channel",
    },
    FilterMeta {
        name: "tag",
        value_kind: ValueKind::String,
        enum_values: &[],
        description: "Clips carrying a tag",
    },
    FilterMeta {
        name: "votes",
        value_kind: ValueKind::Range,
        enum_values: &[],
        description: "Vote score",
    },
    FilterMeta {
        name: "views",
        value_kind: ValueKind::Range,
        enum_values: &[],
        description: "View count",
    },
    FilterMeta {
        name: "duration",
        value_kind: ValueKind::Range,
        enum_values: &[],
        description: "Clip length in seconds",
    },
    FilterMeta {
        name: "after",
        value_kind: ValueKind::Date,
        enum_values: RELATIVE_DATES,
        description: "Created on or after a date",
    },
    FilterMeta {
        name: "before",
        value_kind: ValueKind::Date,
        enum_values: RELATIVE_DATES,
        description: "Created before a date",
    },
    FilterMeta {
        name: "is",
        value_kind: ValueKind::Flag,
        enum_values: &["featured", "nsfw", "live", "favorited"],
        description: "Clip state",
    },
    FilterMeta {
        name: "sort",
        value_kind: ValueKind::Enum,
        enum_values: &["relevance", "recent", "popular", "trending", "top", "discussed"],
        description: "Result ordering",
    },
    FilterMeta {
        name: "language",
        value_kind: ValueKind::Enum,
        enum_values: &["en", "es", "fr", "de", "pt", "ja", "ko", "ru"],
        description: "Broadcast language",
    },
    FilterMeta {
        name: "type",
        value_kind: ValueKind::Enum,
        enum_values: &["clips", "creators", "games", "tags"],
        description: "Kind of result",
    },
    FilterMeta {
        name: "role",
        value_kind: ValueKind::Enum,
        enum_values: &["user", "creator", "moderator", "admin"],
        description: "Account role of the submitter",
    },
];

/// Read-only view over a filter catalog
#[derive(Debug, Clone, Copy)]
pub struct FilterRegistry {
    filters: &'static [FilterMeta],
}

/// Process-wide registry
pub static REGISTRY: FilterRegistry = FilterRegistry { filters: FILTERS };

impl FilterRegistry {
    /// Look up a filter by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<&'static FilterMeta> {
        self.filters.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// All filters in declaration order
    pub fn filters(&self) -> &'static [FilterMeta] {
        self.filters
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.filters.iter().map(|f| f.name)
    }
}
