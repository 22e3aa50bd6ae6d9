//! Domain types for the publishing model with strong typing.
//!
//! Entity identifiers are newtypes so a `UserId` can never be passed where an
//! `ArticleId` is expected. Slug derivation, tag normalization and pagination
//! live here because every service needs the same rules.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, concat!(stringify!($name), " should be non-negative"));
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a registered user.
    ///
    /// ```rust
    /// use scribe::domain::UserId;
    ///
    /// let id = UserId::new(7);
    /// assert_eq!(id.value(), 7);
    /// assert_eq!(id.to_string(), "7");
    /// ```
    UserId
);

entity_id!(
    /// Unique identifier for an article.
    ArticleId
);

entity_id!(
    /// Unique identifier for a comment.
    CommentId
);

/// URL-safe identifier derived from an article title.
///
/// Lowercase ASCII, runs of anything non-alphanumeric collapse to a single
/// `-`, no leading or trailing dash. The same title always yields the same
/// slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Returns `None` when the title has nothing slug-worthy in it
    /// (e.g. only punctuation).
    #[must_use]
    pub fn from_title(title: &str) -> Option<Self> {
        let slug = slug::slugify(title);
        if slug.is_empty() {
            None
        } else {
            Some(Self(slug))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trims tag names, drops empty ones and removes duplicates while keeping the
/// first occurrence.
#[must_use]
pub fn normalize_tags<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .filter_map(|name| {
            let trimmed = name.as_ref().trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Limit/offset window for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Largest offset SQLite can bind; it takes signed 64-bit integers.
    pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

    /// Builds a page, falling back to `default_limit` and clamping the limit
    /// into `1..=max_limit` and the offset into `0..=MAX_OFFSET`.
    #[must_use]
    pub fn new(limit: Option<u64>, offset: Option<u64>, default_limit: u64, max_limit: u64) -> Self {
        let max_limit = max_limit.max(1);
        Self {
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit),
            offset: offset.unwrap_or(0).min(Self::MAX_OFFSET),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

/// Current time in the format stored in every `*_at` column.
#[must_use]
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
