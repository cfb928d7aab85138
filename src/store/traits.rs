use crate::error::StoreResult;
use crate::model::{Id, Lyric, LyricUpdate, NewLyric, NewSong, Page, Song, SongFilter, SongPage, SongUpdate};

#[async_trait::async_trait]
pub trait SongStore: Send + Sync {
    /// Get a song with its lyrics eagerly loaded
    async fn get_song(&self, id: Id) -> StoreResult<Song>;
    /// List songs matching the filter; `total` is counted before pagination
    async fn list_songs(&self, filter: &SongFilter, page: Page) -> StoreResult<SongPage>;
    /// Insert a song and its nested lyrics as a single unit
    async fn create_song(&self, new_song: NewSong) -> StoreResult<Song>;
    /// Overwrite the fields present in `update` and return the refreshed song
    async fn update_song(&self, id: Id, update: SongUpdate) -> StoreResult<Song>;
    /// Delete a song after removing the lyrics that reference it
    async fn delete_song(&self, id: Id) -> StoreResult<()>;
}

#[async_trait::async_trait]
pub trait LyricStore: Send + Sync {
    async fn get_lyric(&self, id: Id) -> StoreResult<Lyric>;
    async fn create_lyric(&self, new_lyric: NewLyric) -> StoreResult<Lyric>;
    async fn update_lyric(&self, id: Id, update: LyricUpdate) -> StoreResult<Lyric>;
    async fn delete_lyric(&self, id: Id) -> StoreResult<()>;
}

pub trait Store: SongStore + LyricStore + Send + Sync {}
