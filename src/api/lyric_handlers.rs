use crate::api::handlers::{
    invalid_payload, parse_body, parse_path_id, store_error_response, ApiResult, AppState,
};
use crate::model::{Id, Lyric, LyricUpdate, NewLyric};
use crate::store::traits::Store;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;

// Lyric request/response structures
#[derive(Debug, Serialize)]
pub struct LyricResponse {
    pub lyric: Lyric,
}

#[derive(Debug, Serialize)]
pub struct DeletedLyricResponse {
    pub deleted_lyric_id: Id,
}

pub async fn get_lyric<S: Store>(
    State(store): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> ApiResult<LyricResponse> {
    let id = parse_path_id(&raw_id)?;

    match store.get_lyric(id).await {
        Ok(lyric) => Ok(Json(LyricResponse { lyric })),
        Err(e) => Err(store_error_response(e)),
    }
}

pub async fn create_lyric<S: Store>(
    State(store): State<AppState<S>>,
    payload: Result<RequestJson<NewLyric>, JsonRejection>,
) -> ApiResult<LyricResponse> {
    let new_lyric = parse_body(payload)?;
    new_lyric.validate().map_err(invalid_payload)?;
    log::debug!("received lyric: {:?}", new_lyric);

    match store.create_lyric(new_lyric).await {
        Ok(lyric) => {
            log::info!("created lyric {} for song {}", lyric.id, lyric.song_id);
            Ok(Json(LyricResponse { lyric }))
        }
        Err(e) => Err(store_error_response(e)),
    }
}

pub async fn update_lyric<S: Store>(
    State(store): State<AppState<S>>,
    Path(raw_id): Path<String>,
    payload: Result<RequestJson<LyricUpdate>, JsonRejection>,
) -> ApiResult<LyricResponse> {
    let id = parse_path_id(&raw_id)?;
    let update = parse_body(payload)?;
    update.validate().map_err(invalid_payload)?;
    log::debug!("received update for lyric {}: {:?}", id, update);

    match store.update_lyric(id, update).await {
        Ok(lyric) => {
            log::info!("updated lyric {}", id);
            Ok(Json(LyricResponse { lyric }))
        }
        Err(e) => Err(store_error_response(e)),
    }
}

pub async fn delete_lyric<S: Store>(
    State(store): State<AppState<S>>,
    Path(raw_id): Path<String>,
) -> ApiResult<DeletedLyricResponse> {
    let id = parse_path_id(&raw_id)?;

    match store.delete_lyric(id).await {
        Ok(()) => {
            log::info!("deleted lyric {}", id);
            Ok(Json(DeletedLyricResponse {
                deleted_lyric_id: id,
            }))
        }
        Err(e) => Err(store_error_response(e)),
    }
}
