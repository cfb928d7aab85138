use parking_lot::RwLock;
use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::model::{
    Id, Lyric, LyricUpdate, NewLyric, NewSong, Page, Song, SongFilter, SongPage, SongUpdate,
};
use crate::store::traits::{LyricStore, SongStore, Store};

/// Rows keyed by id; `BTreeMap` iteration order is insertion order because
/// ids only grow.
#[derive(Debug, Default)]
struct Tables {
    songs: BTreeMap<Id, Song>,
    lyrics: BTreeMap<Id, Lyric>,
    last_song_id: Id,
    last_lyric_id: Id,
}

impl Tables {
    fn next_song_id(&mut self) -> Id {
        self.last_song_id += 1;
        self.last_song_id
    }

    fn next_lyric_id(&mut self) -> Id {
        self.last_lyric_id += 1;
        self.last_lyric_id
    }

    fn with_lyrics(&self, song: &Song) -> Song {
        let mut song = song.clone();
        song.lyrics = self
            .lyrics
            .values()
            .filter(|lyric| lyric.song_id == song.id)
            .cloned()
            .collect();
        song
    }
}

/// Process-local store used when `storage.use_in_memory` is set, and by tests.
///
/// Every operation runs under a single lock acquisition, so multi-row
/// writes are all-or-nothing just like the Postgres transactions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn song_count(&self) -> usize {
        self.tables.read().songs.len()
    }

    pub fn lyric_count(&self) -> usize {
        self.tables.read().lyrics.len()
    }
}

#[async_trait::async_trait]
impl SongStore for MemoryStore {
    async fn get_song(&self, id: Id) -> StoreResult<Song> {
        let tables = self.tables.read();
        tables
            .songs
            .get(&id)
            .map(|song| tables.with_lyrics(song))
            .ok_or_else(|| StoreError::song_not_found(id))
    }

    async fn list_songs(&self, filter: &SongFilter, page: Page) -> StoreResult<SongPage> {
        let tables = self.tables.read();
        let matching: Vec<&Song> = tables
            .songs
            .values()
            .filter(|song| filter.matches(song))
            .collect();

        let total = matching.len() as i64;
        let songs = page
            .slice(&matching)
            .into_iter()
            .map(|song| tables.with_lyrics(song))
            .collect();

        Ok(SongPage { songs, total })
    }

    async fn create_song(&self, new_song: NewSong) -> StoreResult<Song> {
        let mut tables = self.tables.write();
        let id = tables.next_song_id();

        let mut song = Song {
            id,
            group: new_song.group,
            title: new_song.title,
            release_date: new_song.release_date,
            link: new_song.link,
            lyrics: Vec::new(),
        };
        tables.songs.insert(id, song.clone());

        for verse in new_song.lyrics {
            let lyric = Lyric {
                id: tables.next_lyric_id(),
                song_id: id,
                verse_number: verse.verse_number,
                text: verse.text,
            };
            tables.lyrics.insert(lyric.id, lyric.clone());
            song.lyrics.push(lyric);
        }

        Ok(song)
    }

    async fn update_song(&self, id: Id, update: SongUpdate) -> StoreResult<Song> {
        let mut tables = self.tables.write();
        let song = tables
            .songs
            .get_mut(&id)
            .ok_or_else(|| StoreError::song_not_found(id))?;
        update.apply_to(song);

        let song = song.clone();
        Ok(tables.with_lyrics(&song))
    }

    async fn delete_song(&self, id: Id) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if !tables.songs.contains_key(&id) {
            return Err(StoreError::song_not_found(id));
        }

        tables.lyrics.retain(|_, lyric| lyric.song_id != id);
        tables.songs.remove(&id);

        Ok(())
    }
}

#[async_trait::async_trait]
impl LyricStore for MemoryStore {
    async fn get_lyric(&self, id: Id) -> StoreResult<Lyric> {
        self.tables
            .read()
            .lyrics
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::lyric_not_found(id))
    }

    async fn create_lyric(&self, new_lyric: NewLyric) -> StoreResult<Lyric> {
        let mut tables = self.tables.write();
        if !tables.songs.contains_key(&new_lyric.song_id) {
            return Err(StoreError::song_not_found(new_lyric.song_id));
        }

        let lyric = new_lyric.into_lyric(tables.next_lyric_id());
        tables.lyrics.insert(lyric.id, lyric.clone());

        Ok(lyric)
    }

    async fn update_lyric(&self, id: Id, update: LyricUpdate) -> StoreResult<Lyric> {
        let mut tables = self.tables.write();
        if !tables.lyrics.contains_key(&id) {
            return Err(StoreError::lyric_not_found(id));
        }
        if let Some(song_id) = update.song_id {
            if !tables.songs.contains_key(&song_id) {
                return Err(StoreError::song_not_found(song_id));
            }
        }

        let lyric = tables
            .lyrics
            .get_mut(&id)
            .ok_or_else(|| StoreError::lyric_not_found(id))?;
        update.apply_to(lyric);

        Ok(lyric.clone())
    }

    async fn delete_lyric(&self, id: Id) -> StoreResult<()> {
        self.tables
            .write()
            .lyrics
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::lyric_not_found(id))
    }
}

impl Store for MemoryStore {}
