use utoipa::OpenApi;
use utoipa::ToSchema;

/// Multipart (or form/JSON) body of `POST /upload`.
#[allow(non_snake_case)]
#[derive(ToSchema)]
pub struct UploadRequestDoc {
    pub macId: String,
    pub m3uUrl: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub m3uFile: Option<Vec<u8>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::playlists::upload,
        crate::routes::playlists::get_m3u,
        crate::routes::playlists::list_mac_ids,
        crate::routes::host::get_mac_address,
    ),
    components(
        schemas(
            UploadRequestDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "playlists"),
        (name = "host")
    )
)]
pub struct ApiDoc;
