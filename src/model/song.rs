use crate::model::{null_as_default, reject_nul, Id, InvalidPayload, Lyric};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub id: Id,
    pub group: String,
    pub title: String,
    pub release_date: String, // free-form, not validated as a calendar date
    pub link: String,
    pub lyrics: Vec<Lyric>, // insertion order
}

/// Body of `POST /songs`. Missing and `null` fields default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSong {
    #[serde(deserialize_with = "null_as_default")]
    pub group: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lyrics: Vec<NewSongLyric>,
}

/// A verse submitted together with its song. The owning song id is
/// assigned on insert, so any `song_id` in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSongLyric {
    #[serde(deserialize_with = "null_as_default")]
    pub verse_number: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
}

impl NewSong {
    pub fn new(group: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_release_date(mut self, release_date: impl Into<String>) -> Self {
        self.release_date = release_date.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }

    pub fn with_verse(mut self, verse_number: i32, text: impl Into<String>) -> Self {
        self.lyrics.push(NewSongLyric {
            verse_number,
            text: text.into(),
        });
        self
    }

    pub fn validate(&self) -> Result<(), InvalidPayload> {
        reject_nul("group", &self.group)?;
        reject_nul("title", &self.title)?;
        reject_nul("release_date", &self.release_date)?;
        reject_nul("link", &self.link)?;
        self.lyrics
            .iter()
            .try_for_each(|verse| reject_nul("lyrics.text", &verse.text))
    }
}

/// Body of `PUT /songs/:id`.
///
/// Each field is written only when present in the request, so an explicit
/// empty string clears a field while an omitted one leaves it untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl SongUpdate {
    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    pub fn validate(&self) -> Result<(), InvalidPayload> {
        self.fields()
            .into_iter()
            .try_for_each(|(column, value)| reject_nul(column, value))
    }

    /// Present fields as `(column, value)` pairs, in column order
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("group", &self.group),
            ("title", &self.title),
            ("release_date", &self.release_date),
            ("link", &self.link),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.as_deref().map(|v| (column, v)))
        .collect()
    }

    pub fn apply_to(&self, song: &mut Song) {
        if let Some(group) = &self.group {
            song.group = group.clone();
        }
        if let Some(title) = &self.title {
            song.title = title.clone();
        }
        if let Some(release_date) = &self.release_date {
            song.release_date = release_date.clone();
        }
        if let Some(link) = &self.link {
            song.link = link.clone();
        }
    }
}
