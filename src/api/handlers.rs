use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{Html, Json},
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::StoreError;
use crate::model::{parse_id, Id, InvalidPayload, NewSong, Page, Song, SongFilter, SongUpdate};
use crate::store::traits::Store;

pub type AppState<S> = Arc<S>;

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Query string of `GET /songs`. Everything arrives as text so that bad
/// pagination values can fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct SongListQuery {
    pub group: Option<String>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub link: Option<String>,
    pub offset: Option<String>,
    pub page_size: Option<String>,
}

impl SongListQuery {
    pub fn filter(&self) -> SongFilter {
        SongFilter {
            group: self.group.clone(),
            title: self.title.clone(),
            release_date: self.release_date.clone(),
            link: self.link.clone(),
        }
    }

    pub fn page(&self) -> Page {
        Page::from_params(self.offset.as_deref(), self.page_size.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct SongResponse {
    pub song: Song,
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub data: Vec<Song>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub offset: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedSongResponse {
    pub deleted_song_id: Id,
}

pub(crate) fn client_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    log::warn!("rejected request: {}", message);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

pub(crate) fn invalid_payload(err: InvalidPayload) -> (StatusCode, Json<ErrorResponse>) {
    client_error(&err.to_string())
}

/// Parse an `:id` path segment, rejecting anything but a positive integer
pub(crate) fn parse_path_id(raw: &str) -> Result<Id, (StatusCode, Json<ErrorResponse>)> {
    parse_id(raw).map_err(|e| {
        log::warn!("{}", e);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new("invalid id")))
    })
}

/// Unwrap a JSON body; every kind of body rejection is reported as 400
pub(crate) fn parse_body<T>(
    payload: Result<RequestJson<T>, JsonRejection>,
) -> Result<T, (StatusCode, Json<ErrorResponse>)> {
    match payload {
        Ok(RequestJson(body)) => Ok(body),
        Err(rejection) => Err(client_error(&rejection.body_text())),
    }
}

pub(crate) fn store_error_response(err: StoreError) -> (StatusCode, Json<ErrorResponse>) {
    match &err {
        StoreError::NotFound { .. } => {
            log::warn!("{}", err);
            (StatusCode::NOT_FOUND, Json(ErrorResponse::new(&err.to_string())))
        }
        StoreError::Storage(cause) => {
            log::error!("storage failure: {:#}", cause);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(&format!("{:#}", cause))),
            )
        }
    }
}

// API Documentation handlers
pub async fn get_api_docs() -> Html<String> {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Song Library API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui.css" />
    <style>
        html {
            box-sizing: border-box;
            overflow-y: scroll;
        }
        body {
            margin: 0;
            background: #fafafa;
        }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            const ui = SwaggerUIBundle({
                url: '/docs/openapi.json',
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    Html(html.to_string())
}

pub async fn get_openapi_spec() -> Json<serde_json::Value> {
    Json(openapi_document())
}

fn id_parameter(description: &str) -> serde_json::Value {
    serde_json::json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "integer", "format": "int64", "minimum": 1 }
    })
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json_response(
        description,
        serde_json::json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn query_parameter(name: &str, kind: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "in": "query",
        "required": false,
        "description": description,
        "schema": { "type": kind }
    })
}

pub fn openapi_document() -> serde_json::Value {
    let song_envelope = serde_json::json!({
        "type": "object",
        "properties": { "song": { "$ref": "#/components/schemas/Song" } }
    });
    let lyric_envelope = serde_json::json!({
        "type": "object",
        "properties": { "lyric": { "$ref": "#/components/schemas/Lyric" } }
    });

    serde_json::json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Song Library API",
            "version": "1.0.0",
            "description": "Songs and their lyrics, with filtering and pagination."
        },
        "servers": [{ "url": "/", "description": "Current server" }],
        "tags": [
            { "name": "Songs", "description": "Song CRUD operations" },
            { "name": "Lyrics", "description": "Lyric CRUD operations" },
            { "name": "Documentation", "description": "API documentation endpoints" }
        ],
        "paths": {
            "/songs": {
                "get": {
                    "tags": ["Songs"],
                    "summary": "List songs",
                    "description": "Exact-match filters are AND-combined. Pagination defaults to offset 0 and page size 10.",
                    "parameters": [
                        query_parameter("group", "string", "Filter by group name"),
                        query_parameter("title", "string", "Filter by title"),
                        query_parameter("release_date", "string", "Filter by release date"),
                        query_parameter("link", "string", "Filter by link"),
                        query_parameter("offset", "integer", "Zero-based offset (default 0)"),
                        query_parameter("page_size", "integer", "Items per page (default 10)")
                    ],
                    "responses": {
                        "200": json_response("Songs with pagination metadata", serde_json::json!({ "$ref": "#/components/schemas/SongList" })),
                        "500": error_response("Storage failure")
                    }
                },
                "post": {
                    "tags": ["Songs"],
                    "summary": "Create a song",
                    "description": "The song and its nested lyrics are stored atomically.",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewSong" } } }
                    },
                    "responses": {
                        "200": json_response("Created song", song_envelope.clone()),
                        "400": error_response("Malformed body"),
                        "500": error_response("Storage failure")
                    }
                }
            },
            "/songs/{id}": {
                "get": {
                    "tags": ["Songs"],
                    "summary": "Get a song with its lyrics",
                    "parameters": [id_parameter("Song ID")],
                    "responses": {
                        "200": json_response("Song details", song_envelope.clone()),
                        "400": error_response("Invalid song ID"),
                        "404": error_response("Song not found")
                    }
                },
                "put": {
                    "tags": ["Songs"],
                    "summary": "Update a song",
                    "description": "Only the fields present in the body are changed.",
                    "parameters": [id_parameter("Song ID")],
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/SongUpdate" } } }
                    },
                    "responses": {
                        "200": json_response("Updated song", song_envelope),
                        "400": error_response("Invalid ID or body"),
                        "404": error_response("Song not found")
                    }
                },
                "delete": {
                    "tags": ["Songs"],
                    "summary": "Delete a song and its lyrics",
                    "parameters": [id_parameter("Song ID")],
                    "responses": {
                        "200": json_response("ID of the deleted song", serde_json::json!({
                            "type": "object",
                            "properties": { "deleted_song_id": { "type": "integer", "format": "int64" } }
                        })),
                        "400": error_response("Invalid song ID"),
                        "404": error_response("Song not found")
                    }
                }
            },
            "/lyrics": {
                "post": {
                    "tags": ["Lyrics"],
                    "summary": "Create a lyric for an existing song",
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/NewLyric" } } }
                    },
                    "responses": {
                        "200": json_response("Created lyric", lyric_envelope.clone()),
                        "400": error_response("Malformed body"),
                        "404": error_response("Referenced song not found")
                    }
                }
            },
            "/lyrics/{id}": {
                "get": {
                    "tags": ["Lyrics"],
                    "summary": "Get a lyric",
                    "parameters": [id_parameter("Lyric ID")],
                    "responses": {
                        "200": json_response("Lyric details", lyric_envelope.clone()),
                        "400": error_response("Invalid lyric ID"),
                        "404": error_response("Lyric not found")
                    }
                },
                "put": {
                    "tags": ["Lyrics"],
                    "summary": "Update a lyric",
                    "parameters": [id_parameter("Lyric ID")],
                    "requestBody": {
                        "required": true,
                        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/LyricUpdate" } } }
                    },
                    "responses": {
                        "200": json_response("Updated lyric", lyric_envelope),
                        "400": error_response("Invalid ID or body"),
                        "404": error_response("Lyric or referenced song not found")
                    }
                },
                "delete": {
                    "tags": ["Lyrics"],
                    "summary": "Delete a lyric",
                    "parameters": [id_parameter("Lyric ID")],
                    "responses": {
                        "200": json_response("ID of the deleted lyric", serde_json::json!({
                            "type": "object",
                            "properties": { "deleted_lyric_id": { "type": "integer", "format": "int64" } }
                        })),
                        "400": error_response("Invalid lyric ID"),
                        "404": error_response("Lyric not found")
                    }
                }
            },
            "/docs": {
                "get": {
                    "tags": ["Documentation"],
                    "summary": "Interactive API documentation",
                    "responses": { "200": { "description": "HTML page with Swagger UI" } }
                }
            },
            "/docs/openapi.json": {
                "get": {
                    "tags": ["Documentation"],
                    "summary": "This OpenAPI document",
                    "responses": { "200": { "description": "OpenAPI 3 document" } }
                }
            }
        },
        "components": {
            "schemas": {
                "Song": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "group": { "type": "string" },
                        "title": { "type": "string" },
                        "release_date": { "type": "string" },
                        "link": { "type": "string" },
                        "lyrics": { "type": "array", "items": { "$ref": "#/components/schemas/Lyric" } }
                    }
                },
                "Lyric": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "song_id": { "type": "integer", "format": "int64" },
                        "verse_number": { "type": "integer" },
                        "text": { "type": "string" }
                    }
                },
                "NewSong": {
                    "type": "object",
                    "properties": {
                        "group": { "type": "string" },
                        "title": { "type": "string" },
                        "release_date": { "type": "string" },
                        "link": { "type": "string" },
                        "lyrics": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "verse_number": { "type": "integer" },
                                    "text": { "type": "string" }
                                }
                            }
                        }
                    }
                },
                "SongUpdate": {
                    "type": "object",
                    "description": "Omitted fields are left unchanged; an empty string clears a field.",
                    "properties": {
                        "group": { "type": "string" },
                        "title": { "type": "string" },
                        "release_date": { "type": "string" },
                        "link": { "type": "string" }
                    }
                },
                "NewLyric": {
                    "type": "object",
                    "properties": {
                        "song_id": { "type": "integer", "format": "int64" },
                        "verse_number": { "type": "integer" },
                        "text": { "type": "string" }
                    }
                },
                "LyricUpdate": {
                    "type": "object",
                    "properties": {
                        "song_id": { "type": "integer", "format": "int64" },
                        "verse_number": { "type": "integer" },
                        "text": { "type": "string" }
                    }
                },
                "SongList": {
                    "type": "object",
                    "properties": {
                        "data": { "type": "array", "items": { "$ref": "#/components/schemas/Song" } },
                        "pagination": {
                            "type": "object",
                            "properties": {
                                "total": { "type": "integer", "format": "int64" },
                                "offset": { "type": "integer", "format": "int64" },
                                "page_size": { "type": "integer", "format": "int64" }
                            }
                        }
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": { "error": { "type": "string" } }
                }
            }
        }
    })
}

// Song handlers
pub async fn list_songs<S: Store>(
    State(store): State<AppState<S>>,
    Query(query): Query<SongListQuery>,
) -> ApiResult<SongListResponse> {
    let filter = query.filter();
    filter.validate().map_err(invalid_payload)?;
    let page = query.page();

    match store.list_songs(&filter, page).await {
        Ok(result) => Ok(Json(SongListResponse {
            data: result.songs,
            pagination: Pagination {
                total: result.total,
                offset: page.offset,
                page_size: page.limit,
            },
        })),
        Err(e) => Err(store_error_response(e)),
    }
}

pub async fn get_song<S: Store>(
    State(store): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> ApiResult<SongResponse> {
    let id = parse_path_id(&raw_id)?;

    match store.get_song(id).await {
        Ok(song) => Ok(Json(SongResponse { song })),
        Err(e) => Err(store_error_response(e)),
    }
}

pub async fn create_song<S: Store>(
    State(store): State<AppState<S>>,
    payload: Result<RequestJson<NewSong>, JsonRejection>,
) -> ApiResult<SongResponse> {
    let new_song = parse_body(payload)?;
    new_song.validate().map_err(invalid_payload)?;
    log::debug!("received song: {:?}", new_song);

    match store.create_song(new_song).await {
        Ok(song) => {
            log::info!("created song {} with {} lyrics", song.id, song.lyrics.len());
            Ok(Json(SongResponse { song }))
        }
        Err(e) => Err(store_error_response(e)),
    }
}

pub async fn update_song<S: Store>(
    State(store): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<RequestJson<SongUpdate>, JsonRejection>,
) -> ApiResult<SongResponse> {
    let id = parse_path_id(&raw_id)?;
    let update = parse_body(payload)?;
    update.validate().map_err(invalid_payload)?;
    log::debug!("received update for song {}: {:?}", id, update);

    match store.update_song(id, update).await {
        Ok(song) => {
            log::info!("updated song {}", id);
            Ok(Json(SongResponse { song }))
        }
        Err(e) => Err(store_error_response(e)),
    }
}

pub async fn delete_song<S: Store>(
    State(store): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> ApiResult<DeletedSongResponse> {
    let id = parse_path_id(&raw_id)?;

    match store.delete_song(id).await {
        Ok(()) => {
            log::info!("deleted song {}", id);
            Ok(Json(DeletedSongResponse {
                deleted_song_id: id,
            }))
        }
        Err(e) => Err(store_error_response(e)),
    }
}
