use crate::model::{null_as_default, reject_nul, Id, InvalidPayload};
use serde::{Deserialize, Serialize};

/// One verse of a song's lyrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lyric {
    pub id: Id,
    pub song_id: Id,
    pub verse_number: i32,
    pub text: String,
}

/// Body of `POST /lyrics`. Missing and `null` fields default to zero / empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewLyric {
    #[serde(deserialize_with = "null_as_default")]
    pub song_id: Id,
    #[serde(deserialize_with = "null_as_default")]
    pub verse_number: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
}

impl NewLyric {
    pub fn validate(&self) -> Result<(), InvalidPayload> {
        reject_nul("text", &self.text)
    }

    pub fn into_lyric(self, id: Id) -> Lyric {
        Lyric {
            id,
            song_id: self.song_id,
            verse_number: self.verse_number,
            text: self.text,
        }
    }
}

/// Body of `PUT /lyrics/:id`. Only the fields present are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LyricUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_number: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl LyricUpdate {
    pub fn is_empty(&self) -> bool {
        self.song_id.is_none() && self.verse_number.is_none() && self.text.is_none()
    }

    pub fn validate(&self) -> Result<(), InvalidPayload> {
        match &self.text {
            Some(text) => reject_nul("text", text),
            None => Ok(()),
        }
    }

    pub fn apply_to(&self, lyric: &mut Lyric) {
        if let Some(song_id) = self.song_id {
            lyric.song_id = song_id;
        }
        if let Some(verse_number) = self.verse_number {
            lyric.verse_number = verse_number;
        }
        if let Some(text) = &self.text {
            lyric.text = text.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lyric_update_distinguishes_cleared_from_omitted() {
        let update: LyricUpdate = serde_json::from_str(r#"{"text": ""}"#).unwrap();
        assert_eq!(update.text, Some(String::new()));
        assert_eq!(update.verse_number, None);

        let mut lyric = Lyric {
            id: 1,
            song_id: 2,
            verse_number: 3,
            text: "Is this the real life?".to_string(),
        };
        update.apply_to(&mut lyric);
        assert_eq!(lyric.text, "");
        assert_eq!(lyric.verse_number, 3);
        assert_eq!(lyric.song_id, 2);
    }

    #[test]
    fn test_new_lyric_defaults_missing_fields() {
        let new_lyric: NewLyric = serde_json::from_str(r#"{"song_id": 5}"#).unwrap();
        assert_eq!(new_lyric.song_id, 5);
        assert_eq!(new_lyric.verse_number, 0);
        assert!(new_lyric.text.is_empty());

        let new_lyric: NewLyric =
            serde_json::from_str(r#"{"song_id": 5, "verse_number": null, "text": null}"#).unwrap();
        assert_eq!(new_lyric.verse_number, 0);
        assert!(new_lyric.text.is_empty());
    }

    #[test]
    fn test_lyric_text_with_nul_is_invalid() {
        let new_lyric = NewLyric {
            song_id: 1,
            verse_number: 1,
            text: "bad\u{0}byte".to_string(),
        };
        assert!(new_lyric.validate().is_err());

        let update = LyricUpdate {
            text: Some("\u{0}".to_string()),
            ..LyricUpdate::default()
        };
        assert!(update.validate().is_err());
        assert!(LyricUpdate::default().validate().is_ok());
    }
}
