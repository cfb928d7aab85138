use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgRow},
    PgPool, Postgres, QueryBuilder, Row,
};
use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};
use crate::model::{
    Id, Lyric, LyricUpdate, NewLyric, NewSong, Page, Song, SongFilter, SongPage, SongUpdate,
};
use crate::store::traits::{LyricStore, SongStore, Store};

const SELECT_SONG: &str = r#"SELECT id, "group", title, release_date, link FROM songs"#;
const SELECT_LYRIC: &str = "SELECT id, song_id, verse_number, text FROM lyrics";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store from resolved connection options
    pub async fn new(options: PgConnectOptions, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    async fn attach_lyrics(&self, songs: &mut [Song]) -> Result<()> {
        if songs.is_empty() {
            return Ok(());
        }

        let song_ids: Vec<Id> = songs.iter().map(|song| song.id).collect();
        let rows = sqlx::query(&format!("{SELECT_LYRIC} WHERE song_id = ANY($1) ORDER BY id"))
            .bind(song_ids)
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch lyrics")?;

        let mut by_song: HashMap<Id, Vec<Lyric>> = HashMap::new();
        for row in &rows {
            let lyric = lyric_from_row(row).context("Failed to decode lyric row")?;
            by_song.entry(lyric.song_id).or_default().push(lyric);
        }

        for song in songs.iter_mut() {
            song.lyrics = by_song.remove(&song.id).unwrap_or_default();
        }

        Ok(())
    }
}

fn song_from_row(row: &PgRow) -> Result<Song, sqlx::Error> {
    Ok(Song {
        id: row.try_get("id")?,
        group: row.try_get("group")?,
        title: row.try_get("title")?,
        release_date: row.try_get("release_date")?,
        link: row.try_get("link")?,
        lyrics: Vec::new(),
    })
}

fn lyric_from_row(row: &PgRow) -> Result<Lyric, sqlx::Error> {
    Ok(Lyric {
        id: row.try_get("id")?,
        song_id: row.try_get("song_id")?,
        verse_number: row.try_get("verse_number")?,
        text: row.try_get("text")?,
    })
}

/// Append `WHERE col = $n AND ...` for every active predicate
fn push_song_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &SongFilter) {
    for (index, (column, value)) in filter.predicates().into_iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        builder
            .push('"')
            .push(column)
            .push("\" = ")
            .push_bind(value.to_string());
    }
}

/// Filtered, ordered page of songs without their lyrics
fn song_page_query(filter: &SongFilter, page: Page) -> QueryBuilder<'static, Postgres> {
    let mut select = QueryBuilder::<Postgres>::new(SELECT_SONG);
    push_song_filter(&mut select, filter);
    select
        .push(" ORDER BY id OFFSET ")
        .push_bind(page.offset)
        .push(" LIMIT ")
        .push_bind(page.limit);
    select
}

/// `UPDATE songs SET ...` over the present fields only; callers skip empty updates
fn song_update_query(id: Id, update: &SongUpdate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE songs SET ");
    {
        let mut assignments = builder.separated(", ");
        for (column, value) in update.fields() {
            assignments
                .push(format!("\"{column}\" = "))
                .push_bind_unseparated(value.to_string());
        }
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder
}

fn lyric_update_query(id: Id, update: &LyricUpdate) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new("UPDATE lyrics SET ");
    {
        let mut assignments = builder.separated(", ");
        if let Some(song_id) = update.song_id {
            assignments.push("song_id = ").push_bind_unseparated(song_id);
        }
        if let Some(verse_number) = update.verse_number {
            assignments
                .push("verse_number = ")
                .push_bind_unseparated(verse_number);
        }
        if let Some(text) = &update.text {
            assignments.push("text = ").push_bind_unseparated(text.clone());
        }
    }
    builder.push(" WHERE id = ").push_bind(id);
    builder
}

/// A lyric write that hit the foreign key means the referenced song is missing
fn lyric_write_error(err: sqlx::Error, song_id: Option<Id>, action: &'static str) -> StoreError {
    if let (sqlx::Error::Database(db_err), Some(song_id)) = (&err, song_id) {
        if db_err.is_foreign_key_violation() {
            return StoreError::song_not_found(song_id);
        }
    }
    StoreError::Storage(anyhow::Error::new(err).context(action))
}

#[async_trait::async_trait]
impl SongStore for PostgresStore {
    async fn get_song(&self, id: Id) -> StoreResult<Song> {
        let row = sqlx::query(&format!("{SELECT_SONG} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch song")?;

        let Some(row) = row else {
            return Err(StoreError::song_not_found(id));
        };

        let mut songs = vec![song_from_row(&row).context("Failed to decode song row")?];
        self.attach_lyrics(&mut songs).await?;

        songs.pop().ok_or_else(|| StoreError::song_not_found(id))
    }

    async fn list_songs(&self, filter: &SongFilter, page: Page) -> StoreResult<SongPage> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM songs");
        push_song_filter(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count songs")?;

        let rows = song_page_query(filter, page)
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list songs")?;

        let mut songs = rows
            .iter()
            .map(song_from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to decode song row")?;
        self.attach_lyrics(&mut songs).await?;

        Ok(SongPage { songs, total })
    }

    async fn create_song(&self, new_song: NewSong) -> StoreResult<Song> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let row = sqlx::query(
            r#"
            INSERT INTO songs ("group", title, release_date, link)
            VALUES ($1, $2, $3, $4)
            RETURNING id, "group", title, release_date, link
            "#,
        )
        .bind(&new_song.group)
        .bind(&new_song.title)
        .bind(&new_song.release_date)
        .bind(&new_song.link)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert song")?;

        let mut song = song_from_row(&row).context("Failed to decode song row")?;

        for verse in &new_song.lyrics {
            let row = sqlx::query(
                r#"
                INSERT INTO lyrics (song_id, verse_number, text)
                VALUES ($1, $2, $3)
                RETURNING id, song_id, verse_number, text
                "#,
            )
            .bind(song.id)
            .bind(verse.verse_number)
            .bind(&verse.text)
            .fetch_one(&mut *tx)
            .await
            .context("Failed to insert lyric")?;

            song.lyrics
                .push(lyric_from_row(&row).context("Failed to decode lyric row")?);
        }

        tx.commit().await.context("Failed to commit song")?;

        Ok(song)
    }

    async fn update_song(&self, id: Id, update: SongUpdate) -> StoreResult<Song> {
        if update.is_empty() {
            return self.get_song(id).await;
        }

        let result = song_update_query(id, &update)
            .build()
            .execute(&self.pool)
            .await
            .context("Failed to update song")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::song_not_found(id));
        }

        self.get_song(id).await
    }

    async fn delete_song(&self, id: Id) -> StoreResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM lyrics WHERE song_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete lyrics")?;

        let result = sqlx::query("DELETE FROM songs WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete song")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::song_not_found(id));
        }

        tx.commit().await.context("Failed to commit song deletion")?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl LyricStore for PostgresStore {
    async fn get_lyric(&self, id: Id) -> StoreResult<Lyric> {
        let row = sqlx::query(&format!("{SELECT_LYRIC} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch lyric")?;

        match row {
            Some(row) => Ok(lyric_from_row(&row).context("Failed to decode lyric row")?),
            None => Err(StoreError::lyric_not_found(id)),
        }
    }

    async fn create_lyric(&self, new_lyric: NewLyric) -> StoreResult<Lyric> {
        let row = sqlx::query(
            r#"
            INSERT INTO lyrics (song_id, verse_number, text)
            VALUES ($1, $2, $3)
            RETURNING id, song_id, verse_number, text
            "#,
        )
        .bind(new_lyric.song_id)
        .bind(new_lyric.verse_number)
        .bind(&new_lyric.text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| lyric_write_error(e, Some(new_lyric.song_id), "Failed to insert lyric"))?;

        Ok(lyric_from_row(&row).context("Failed to decode lyric row")?)
    }

    async fn update_lyric(&self, id: Id, update: LyricUpdate) -> StoreResult<Lyric> {
        if update.is_empty() {
            return self.get_lyric(id).await;
        }

        let result = lyric_update_query(id, &update)
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| lyric_write_error(e, update.song_id, "Failed to update lyric"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::lyric_not_found(id));
        }

        self.get_lyric(id).await
    }

    async fn delete_lyric(&self, id: Id) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM lyrics WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete lyric")?;

        if result.rows_affected() == 0 {
            return Err(StoreError::lyric_not_found(id));
        }

        Ok(())
    }
}

impl Store for PostgresStore {}
