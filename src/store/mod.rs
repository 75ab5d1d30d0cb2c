//! In-memory collection store.
//!
//! Owns the four immutable collections loaded from a trace export and
//! answers projection and key-lookup queries over them.

pub mod collection_store;
pub mod columns;
pub mod integrity;

pub use collection_store::{Collection, CollectionStore};
pub use columns::{ColumnValue, Record};
pub use integrity::{check_integrity, IntegrityIssue};

use crate::utils::config::{
    CONTEXTS_KEY, EXECUTION_CONTEXTS_KEY, STATIC_CONTEXTS_KEY, STATIC_TRACES_KEY, TRACES_KEY,
};
use crate::utils::error::QueryError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The four recognized collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionName {
    StaticContexts,
    StaticTraces,
    Contexts,
    Traces,
}

impl CollectionName {
    pub const ALL: [CollectionName; 4] = [
        CollectionName::StaticContexts,
        CollectionName::StaticTraces,
        CollectionName::Contexts,
        CollectionName::Traces,
    ];

    /// Canonical collection name
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionName::StaticContexts => STATIC_CONTEXTS_KEY,
            CollectionName::StaticTraces => STATIC_TRACES_KEY,
            CollectionName::Contexts => CONTEXTS_KEY,
            CollectionName::Traces => TRACES_KEY,
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STATIC_CONTEXTS_KEY => Ok(CollectionName::StaticContexts),
            STATIC_TRACES_KEY => Ok(CollectionName::StaticTraces),
            CONTEXTS_KEY | EXECUTION_CONTEXTS_KEY => Ok(CollectionName::Contexts),
            TRACES_KEY => Ok(CollectionName::Traces),
            other => Err(QueryError::UnknownCollection(other.to_string())),
        }
    }
}

/// Outcome of a query expected to match a single row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a, T> {
    None,
    One(&'a T),
    Many { first: &'a T, count: usize },
}

/// Select the rows matching `pred`, distinguishing zero, one and many matches
pub fn select_one<'a, T>(rows: &'a [T], pred: impl Fn(&T) -> bool) -> Selection<'a, T> {
    let mut matches = rows.iter().filter(|row| pred(row));
    let Some(first) = matches.next() else {
        return Selection::None;
    };
    match matches.count() {
        0 => Selection::One(first),
        rest => Selection::Many {
            first,
            count: rest + 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name_round_trip() {
        for name in CollectionName::ALL {
            assert_eq!(name.as_str().parse::<CollectionName>().unwrap(), name);
        }
    }

    #[test]
    fn test_execution_contexts_alias() {
        assert_eq!(
            "executionContexts".parse::<CollectionName>().unwrap(),
            CollectionName::Contexts
        );
    }

    #[test]
    fn test_unknown_collection() {
        assert_eq!(
            "values".parse::<CollectionName>(),
            Err(QueryError::UnknownCollection("values".to_string()))
        );
    }

    #[test]
    fn test_select_one() {
        let rows = [1, 2, 2, 3];
        assert_eq!(select_one(&rows, |r| *r == 9), Selection::None);
        assert_eq!(select_one(&rows, |r| *r == 1), Selection::One(&1));
        assert_eq!(
            select_one(&rows, |r| *r == 2),
            Selection::Many {
                first: &2,
                count: 2
            }
        );
    }
}
