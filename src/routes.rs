use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, MatchedPath, Multipart, Path, Request, State},
    http::Method,
    routing::{delete, get, put},
    Json, Router,
};
use bytes::Bytes;
use metadata_store::FileRecord;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    http_objects::{ApiError, DeleteResponse, UploadResponse},
    registry::FileRegistry,
};

#[derive(Clone)]
pub struct RouteState {
    pub registry: Arc<FileRegistry>,
}

pub fn create_routes(route_state: RouteState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route(
            "/upload",
            put(upload_file).with_state(route_state.clone()),
        )
        .route("/files", get(list_files).with_state(route_state.clone()))
        .route(
            "/delete/{filename}",
            delete(delete_file).with_state(route_state.clone()),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request| {
                    let method = req.method();
                    let uri = req.uri();

                    let matched_path = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::debug_span!("request", %method, %uri, matched_path)
                })
                .on_failure(()),
        )
        .layer(cors)
        .layer(DefaultBodyLimit::max(usize::MAX))
}

async fn index() -> &'static str {
    "Filedepot Server"
}

/// Upload a file: store the blob, mint a one-hour signed access URL, and
/// record both in the files table. The multipart field must be named
/// `file`; a request without one is rejected before any store is touched.
async fn upload_file(
    State(state): State<RouteState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::bad_request("No file part"))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content = field
                .bytes()
                .await
                .map_err(|_| ApiError::bad_request("No file part"))?;
            file = Some((filename, content));
            break;
        }
    }

    let (filename, content) = file.ok_or_else(|| ApiError::bad_request("No file part"))?;

    let outcome = state
        .registry
        .upload(&filename, content)
        .await
        .map_err(ApiError::from_upload_error)?;

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        url: outcome.url,
    }))
}

/// List every stored file record.
async fn list_files(State(state): State<RouteState>) -> Result<Json<Vec<FileRecord>>, ApiError> {
    let files = state
        .registry
        .list_files()
        .await
        .map_err(ApiError::from_list_error)?;

    Ok(Json(files))
}

/// Delete a file: remove the blob, then every record with that filename.
async fn delete_file(
    Path(filename): Path<String>,
    State(state): State<RouteState>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state
        .registry
        .delete(&filename)
        .await
        .map_err(ApiError::from_delete_error)?;

    Ok(Json(DeleteResponse {
        message: "File deleted successfully".to_string(),
    }))
}
