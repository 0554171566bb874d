//! Integer identifier newtypes for the two id spaces.
//!
//! The host system addresses content items and principals by numeric
//! identifiers, which historically arrive as either integers or numeric
//! strings. Both normalize to `i64` at this boundary; storage and
//! comparison always operate on the normalized form. [`ItemId`] and
//! [`PrincipalId`] are distinct types so the two id spaces cannot be
//! conflated in an ordered (item, principal) pair.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

/// The identifier string could not be parsed as an integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier '{0}': expected an integer")]
pub struct ParseIdError(pub String);

/// Identifier of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(i64);

impl ItemId {
    /// Wrap a normalized integer identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The normalized integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ItemId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<i32> for ItemId {
    fn from(raw: i32) -> Self {
        Self(i64::from(raw))
    }
}

impl FromStr for ItemId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_raw(s).map(Self)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for ItemId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for ItemId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

/// Identifier of a principal (account or user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrincipalId(i64);

impl PrincipalId {
    /// Wrap a normalized integer identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The normalized integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for PrincipalId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<i32> for PrincipalId {
    fn from(raw: i32) -> Self {
        Self(i64::from(raw))
    }
}

impl FromStr for PrincipalId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_raw(s).map(Self)
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ToSql for PrincipalId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for PrincipalId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(Self)
    }
}

fn parse_raw(s: &str) -> Result<i64, ParseIdError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| ParseIdError(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{ItemId, ParseIdError, PrincipalId};

    #[test]
    fn numeric_strings_normalize_to_integers() {
        let id: ItemId = "42".parse().expect("parse numeric string");
        assert_eq!(id, ItemId::new(42));

        let id: PrincipalId = " 7 ".parse().expect("parse padded numeric string");
        assert_eq!(id.get(), 7);
    }

    #[test]
    fn non_numeric_strings_are_rejected() {
        let err = "fortytwo".parse::<ItemId>().expect_err("reject word");
        assert_eq!(err, ParseIdError("fortytwo".to_string()));

        assert!("".parse::<PrincipalId>().is_err());
        assert!("12.5".parse::<ItemId>().is_err());
    }

    #[test]
    fn integer_conversion_is_lossless() {
        assert_eq!(ItemId::from(9).get(), 9);
        assert_eq!(ItemId::from(-3).get(), -3);
    }
}
