//! Ordering policies for prefix groups.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use splice_storage::Document;

/// Order in which the documents of a prefix group are concatenated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Storage enumeration order.
    #[default]
    Natural,
    /// File name, case-insensitive.
    Name,
    /// Creation time, oldest first.
    Created,
    /// Modification time, oldest first.
    Modified,
    /// Storage enumeration order, reversed.
    Reverse,
}

/// Error returned when parsing an unknown sort keyword.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid sort option: '{0}'")]
pub struct UnknownSortOrder(pub String);

impl SortOrder {
    /// Keywords accepted by [`FromStr`].
    pub const KEYWORDS: &'static [&'static str] =
        &["natural", "name", "created", "modified", "reverse"];

    /// Keyword for this order.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Name => "name",
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Reverse => "reverse",
        }
    }

    /// Reorder documents in place.
    ///
    /// Sorting is stable. Documents without a timestamp go last when ordering
    /// by time.
    pub fn apply(self, documents: &mut [Document]) {
        match self {
            Self::Natural => {}
            Self::Name => documents.sort_by(|a, b| {
                a.name
                    .to_lowercase()
                    .cmp(&b.name.to_lowercase())
                    .then_with(|| a.name.cmp(&b.name))
            }),
            Self::Created => documents.sort_by(|a, b| by_time(a.created, b.created)),
            Self::Modified => documents.sort_by(|a, b| by_time(a.modified, b.modified)),
            Self::Reverse => documents.reverse(),
        }
    }
}

fn by_time(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "natural" => Ok(Self::Natural),
            "name" => Ok(Self::Name),
            "created" => Ok(Self::Created),
            "modified" => Ok(Self::Modified),
            "reverse" => Ok(Self::Reverse),
            _ => Err(UnknownSortOrder(s.trim().to_owned())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
