use serde::{Deserialize, Deserializer};
use std::fmt;

/// Server-assigned row identifier shared by songs and lyrics.
pub type Id = i64;

/// Client supplied an identifier that is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidId(pub String);

impl fmt::Display for InvalidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidId {}

/// Parse a path segment into an entity id
pub fn parse_id(raw: &str) -> Result<Id, InvalidId> {
    match raw.trim().parse::<Id>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(InvalidId(raw.to_string())),
    }
}

/// A request body or query value that cannot be stored as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPayload(pub String);

impl fmt::Display for InvalidPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidPayload {}

/// PostgreSQL TEXT columns cannot hold the NUL character
pub fn reject_nul(field: &str, value: &str) -> Result<(), InvalidPayload> {
    if value.contains('\0') {
        return Err(InvalidPayload(format!("{field} must not contain NUL characters")));
    }
    Ok(())
}

/// Treat an explicit JSON `null` like an absent field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which kind of entity an operation touched, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Song,
    Lyric,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Song => f.write_str("song"),
            EntityKind::Lyric => f.write_str("lyric"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("1"), Ok(1));
        assert_eq!(parse_id("42"), Ok(42));
        assert_eq!(parse_id(" 7 "), Ok(7));
    }

    #[test]
    fn test_parse_id_rejects_everything_else() {
        for raw in ["", "0", "-3", "abc", "1.5", "99999999999999999999"] {
            assert!(parse_id(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn test_reject_nul() {
        assert!(reject_nul("text", "Is this the real life?").is_ok());
        let err = reject_nul("text", "bad\u{0}byte").unwrap_err();
        assert_eq!(err.to_string(), "text must not contain NUL characters");
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Song.to_string(), "song");
        assert_eq!(EntityKind::Lyric.to_string(), "lyric");
    }
}
