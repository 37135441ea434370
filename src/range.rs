// src/range.rs

use crate::error::{Error, Result};
use crate::model::CommitId;
use std::fmt;
use std::str::FromStr;

/// A commit range as written by a user, before refs are resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RangeSpec {
    /// A single ref: every commit reachable from it
    Ref(String),
    /// Commits reachable from `to` but not from `from`
    Between { from: String, to: String },
}

impl RangeSpec {
    /// Parses `"ref"` or `"from..to"`. An empty lower bound (`"..to"`) means the beginning of history.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = || Error::InvalidRange(expr.to_string());
        let mut parts = expr.split("..");
        let first = parts.next().ok_or_else(invalid)?.trim();
        match (parts.next().map(str::trim), parts.next()) {
            (None, _) if !first.is_empty() => Ok(RangeSpec::Ref(first.to_string())),
            (Some(to), None) if first.is_empty() && !to.is_empty() => Ok(RangeSpec::Ref(to.to_string())),
            (Some(to), None) if !first.is_empty() && !to.is_empty() => Ok(RangeSpec::Between {
                from: first.to_string(),
                to: to.to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    /// The lower bound, absent for a single ref
    pub fn lower(&self) -> Option<&str> {
        match self {
            RangeSpec::Ref(_) => None,
            RangeSpec::Between { from, .. } => Some(from),
        }
    }

    /// The upper bound
    pub fn upper(&self) -> &str {
        match self {
            RangeSpec::Ref(to) | RangeSpec::Between { to, .. } => to,
        }
    }
}

impl FromStr for RangeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        RangeSpec::parse(s)
    }
}

impl From<(&str, &str)> for RangeSpec {
    /// An explicit pair; an empty lower bound means the beginning of history
    fn from((from, to): (&str, &str)) -> Self {
        if from.is_empty() {
            RangeSpec::Ref(to.to_string())
        } else {
            RangeSpec::Between {
                from: from.to_string(),
                to: to.to_string(),
            }
        }
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeSpec::Ref(to) => f.write_str(to),
            RangeSpec::Between { from, to } => write!(f, "{from}..{to}"),
        }
    }
}

/// A range with both bounds resolved to commit identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedRange {
    /// Exclusive lower bound, `None` for the beginning of history
    pub from: Option<CommitId>,
    /// Inclusive upper bound
    pub to: CommitId,
}

impl fmt::Display for ResolvedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.from {
            Some(from) => write!(f, "{from}..{}", self.to),
            None => f.write_str(&self.to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_ref() {
        assert_eq!(RangeSpec::parse("master").unwrap(), RangeSpec::Ref("master".into()));
        assert_eq!(RangeSpec::parse("..master").unwrap(), RangeSpec::Ref("master".into()));
    }

    #[test]
    fn two_sided_range() {
        let range: RangeSpec = "master..development".parse().unwrap();
        assert_eq!(range.lower(), Some("master"));
        assert_eq!(range.upper(), "development");
        assert_eq!(range.to_string(), "master..development");
    }

    #[test]
    fn explicit_pair() {
        assert_eq!(
            RangeSpec::from(("v1.0", "HEAD")),
            RangeSpec::Between { from: "v1.0".into(), to: "HEAD".into() }
        );
        assert_eq!(RangeSpec::from(("", "HEAD")), RangeSpec::Ref("HEAD".into()));
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        for expr in ["", "master..", "..", "a..b..c", "  "] {
            assert!(matches!(RangeSpec::parse(expr), Err(Error::InvalidRange(_))), "{expr}");
        }
    }
}
