use axum::{
    extract::{multipart::MultipartError, FromRequest, Multipart, Path, Request, State},
    http::header,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use service::upload::{PlaylistUpload, UploadedFile};
use tracing::{info, warn};

use crate::errors::{JsonApiError, INVALID_UPLOAD};
use crate::state::AppState;

pub const STORED_MESSAGE: &str = "M3U File/URL stored successfully!";

/// Text fields accepted from form-encoded and JSON bodies.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFields {
    #[serde(default)]
    pub mac_id: Option<String>,
    #[serde(default)]
    pub m3u_url: Option<String>,
}

impl From<UploadFields> for PlaylistUpload {
    fn from(f: UploadFields) -> Self {
        PlaylistUpload { mac_id: f.mac_id, m3u_url: f.m3u_url, file: None }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub links: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksResponse {
    pub mac_id: String,
    pub links: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacIdsResponse {
    pub mac_ids: Vec<String>,
}

#[utoipa::path(
    post, path = "/upload", tag = "playlists",
    request_body(content = crate::openapi::UploadRequestDoc, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored; returns every link for the MAC ID"),
        (status = 400, description = "MAC ID missing, or neither file nor URL given"),
        (status = 500, description = "Persistence failed")
    )
)]
pub async fn upload(State(state): State<AppState>, req: Request) -> Result<Json<UploadResponse>, JsonApiError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let upload = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(req, &state).await.map_err(|e| {
            warn!(error = %e.body_text(), "multipart rejected");
            JsonApiError::new(e.status(), INVALID_UPLOAD)
        })?;
        read_multipart(multipart).await?
    } else if content_type.starts_with("application/json") {
        let Json(fields) = Json::<UploadFields>::from_request(req, &state).await.map_err(|e| {
            warn!(error = %e.body_text(), "json body rejected");
            JsonApiError::new(e.status(), INVALID_UPLOAD)
        })?;
        fields.into()
    } else if content_type.is_empty() {
        PlaylistUpload::default()
    } else {
        let Form(fields) = Form::<UploadFields>::from_request(req, &state).await.map_err(|e| {
            warn!(error = %e.body_text(), "form body rejected");
            JsonApiError::new(e.status(), INVALID_UPLOAD)
        })?;
        fields.into()
    };

    let links = state.uploads.register(upload, &state.base_url).await?;
    Ok(Json(UploadResponse { message: STORED_MESSAGE.to_string(), links }))
}

/// Collect `macId`, `m3uUrl` and the `m3uFile` part; unknown fields are skipped.
async fn read_multipart(mut multipart: Multipart) -> Result<PlaylistUpload, JsonApiError> {
    let mut upload = PlaylistUpload::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "macId" => upload.mac_id = Some(field.text().await.map_err(multipart_error)?),
            "m3uUrl" => upload.m3u_url = Some(field.text().await.map_err(multipart_error)?),
            "m3uFile" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload.file = Some(UploadedFile { file_name, bytes: bytes.to_vec() });
            }
            _ => {}
        }
    }
    Ok(upload)
}

fn multipart_error(e: MultipartError) -> JsonApiError {
    warn!(error = %e.body_text(), "multipart field rejected");
    JsonApiError::new(e.status(), INVALID_UPLOAD)
}

#[utoipa::path(
    get, path = "/get-m3u/{macId}", tag = "playlists",
    params(("macId" = String, Path, description = "Device MAC ID")),
    responses(
        (status = 200, description = "Links for the MAC ID"),
        (status = 404, description = "MAC ID not found")
    )
)]
pub async fn get_m3u(State(state): State<AppState>, Path(mac_id): Path<String>) -> Result<Json<LinksResponse>, JsonApiError> {
    let links = state.store().get(&mac_id).await?;
    Ok(Json(LinksResponse { mac_id, links }))
}

#[utoipa::path(get, path = "/get-mac-ids", tag = "playlists", responses((status = 200, description = "All known MAC IDs")))]
pub async fn list_mac_ids(State(state): State<AppState>) -> Json<MacIdsResponse> {
    let mac_ids = state.store().mac_ids().await;
    info!(count = mac_ids.len(), "list mac ids");
    Json(MacIdsResponse { mac_ids })
}
