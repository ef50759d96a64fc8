use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// IMDb title key: `tt` followed by 5 to 8 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImdbId(String);

impl ImdbId {
    pub const PREFIX: &'static str = "tt";
    pub const MIN_DIGITS: usize = 5;
    pub const MAX_DIGITS: usize = 8;

    /// Parse a well-formed identifier, rejecting anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.strip_prefix(Self::PREFIX)?;
        let len_ok = (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len());
        if len_ok && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(value.to_string()))
        } else {
            None
        }
    }

    /// Wrap a value read back from storage without validating it.
    ///
    /// Legacy databases can hold keys that no longer match the pattern; they
    /// still have to be listed and deletable.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImdbId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// TheTVDB series key, the identifier SickChill indexes shows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TvdbId(pub u64);

impl TvdbId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TvdbId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TvdbId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(TvdbId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_imdb_id_parse_accepts_digit_range() {
        assert!(ImdbId::parse("tt12345").is_some());
        assert!(ImdbId::parse("tt0903747").is_some());
        assert!(ImdbId::parse("tt12345678").is_some());
    }

    #[test]
    fn test_imdb_id_parse_rejects_malformed() {
        assert!(ImdbId::parse("tt1234").is_none());
        assert!(ImdbId::parse("tt123456789").is_none());
        assert!(ImdbId::parse("nm0000123").is_none());
        assert!(ImdbId::parse("tt12a456").is_none());
        assert!(ImdbId::parse("").is_none());
    }

    #[test]
    fn test_tvdb_id_from_str_trims() {
        assert_eq!(" 81189\n".parse::<TvdbId>().unwrap(), TvdbId(81189));
        assert!("abc".parse::<TvdbId>().is_err());
    }
}
