use axum::{
    extract::{multipart::{MultipartError, MultipartRejection}, Multipart, Path, Query, State},
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;
use uuid::Uuid;

use service::errors::{ServiceError, ValidationError};
use service::wallpaper::domain::{Wallpaper, WallpaperPage};
use service::wallpaper::query::{ListParams, WallpaperQuery};
use service::wallpaper::upload::{UploadFile, UploadInput};

use crate::auth::auth_context;
use crate::errors::JsonApiError;
use crate::metrics::{DOWNLOADS_TOTAL, LIST_REQUESTS_TOTAL, UPLOADS_TOTAL, UPLOAD_REJECTIONS_TOTAL};
use crate::state::ServerState;

/// File part name in the upload form.
pub const IMAGE_FIELD: &str = "image";

/// Malformed ids cannot exist, so they are reported like unknown ones.
fn parse_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::not_found("wallpaper"))
}

#[utoipa::path(
    get, path = "/api/wallpapers", tag = "wallpapers",
    params(crate::openapi::ListQueryDoc),
    responses(
        (status = 200, description = "One page of wallpapers", body = crate::openapi::WallpaperPageDoc),
        (status = 503, description = "Storage unavailable", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn list(State(state): State<ServerState>, Query(params): Query<ListParams>) -> Result<Json<WallpaperPage>, JsonApiError> {
    LIST_REQUESTS_TOTAL.inc();
    let query = WallpaperQuery::parse(&params);
    let page = state.wallpapers.list(&query).await?;
    info!(count = page.wallpapers.len(), page = page.current_page, total_pages = page.total_pages, "list wallpapers");
    Ok(Json(page))
}

#[utoipa::path(
    get, path = "/api/wallpapers/categories", tag = "wallpapers",
    responses(
        (status = 200, description = "Distinct categories, ascending", body = [String]),
        (status = 503, description = "Storage unavailable", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn categories(State(state): State<ServerState>) -> Result<Json<Vec<String>>, JsonApiError> {
    Ok(Json(state.wallpapers.categories().await?))
}

#[utoipa::path(
    get, path = "/api/wallpapers/{id}", tag = "wallpapers",
    params(("id" = String, Path, description = "Wallpaper id (UUID)")),
    responses(
        (status = 200, description = "Wallpaper", body = crate::openapi::WallpaperDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Wallpaper>, JsonApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.wallpapers.get(id).await?))
}

#[utoipa::path(
    post, path = "/api/wallpapers", tag = "wallpapers",
    request_body(content = crate::openapi::UploadFormDoc, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Created", body = crate::openapi::WallpaperDoc),
        (status = 400, description = "Missing file or field", body = crate::openapi::ErrorBodyDoc),
        (status = 413, description = "File too large", body = crate::openapi::ErrorBodyDoc),
        (status = 415, description = "Unsupported file type", body = crate::openapi::ErrorBodyDoc),
        (status = 503, description = "Storage unavailable", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn upload(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Wallpaper>), JsonApiError> {
    let auth = auth_context(state.verifier.as_ref(), &headers, &jar).await;
    let max = state.wallpapers.policy().max_file_bytes;
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    let result = match multipart {
        // not a multipart body: nothing that could be a file
        Err(_) => Err(ServiceError::from(ValidationError::MissingFile)),
        Ok(mp) => match read_form(mp, max, declared).await {
            Ok(input) => state.wallpapers.upload(input, &auth).await,
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(w) => {
            UPLOADS_TOTAL.inc();
            Ok((StatusCode::CREATED, Json(w)))
        }
        Err(e) => {
            if matches!(e, ServiceError::Validation(_)) {
                UPLOAD_REJECTIONS_TOTAL.inc();
            }
            Err(e.into())
        }
    }
}

async fn read_form(mut mp: Multipart, max: usize, declared: Option<usize>) -> Result<UploadInput, ServiceError> {
    let err = |e: MultipartError| form_error(e, max, declared);
    let mut input = UploadInput::default();
    while let Some(field) = mp.next_field().await.map_err(err)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            IMAGE_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(err)?;
                // browsers send an empty part for an untouched file input
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                input.file = Some(UploadFile { file_name, content_type, bytes: bytes.to_vec() });
            }
            "title" => input.title = Some(field.text().await.map_err(err)?),
            "description" => input.description = Some(field.text().await.map_err(err)?),
            "category" => input.category = Some(field.text().await.map_err(err)?),
            "tags" => input.tags = Some(field.text().await.map_err(err)?),
            "resolution" => input.resolution = Some(field.text().await.map_err(err)?),
            _ => {}
        }
    }
    Ok(input)
}

fn form_error(e: MultipartError, max: usize, declared: Option<usize>) -> ServiceError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        let size = declared.unwrap_or(max.saturating_add(1));
        return ValidationError::FileTooLarge { size, max }.into();
    }
    ValidationError::Invalid(format!("malformed multipart body: {}", e.body_text())).into()
}

#[utoipa::path(
    put, path = "/api/wallpapers/{id}/download", tag = "wallpapers",
    params(("id" = String, Path, description = "Wallpaper id (UUID)")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated wallpaper", body = crate::openapi::WallpaperDoc),
        (status = 401, description = "Missing or invalid credential", body = crate::openapi::ErrorBodyDoc),
        (status = 404, description = "Not found", body = crate::openapi::ErrorBodyDoc)
    )
)]
pub async fn download(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<Wallpaper>, JsonApiError> {
    let auth = auth_context(state.verifier.as_ref(), &headers, &jar).await;
    auth.require_subject()?;
    let id = parse_id(&id)?;
    let w = state.wallpapers.increment_download(id, &auth).await?;
    DOWNLOADS_TOTAL.inc();
    Ok(Json(w))
}
