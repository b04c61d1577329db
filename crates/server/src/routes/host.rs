use axum::Json;
use serde::{Deserialize, Serialize};
use service::host;
use tracing::error;

use crate::errors::JsonApiError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacAddressResponse {
    pub mac_address: String,
}

#[utoipa::path(
    get, path = "/get-mac-address", tag = "host",
    responses(
        (status = 200, description = "First non-null MAC address of this host, or a sentinel"),
        (status = 500, description = "Interface enumeration failed")
    )
)]
pub async fn get_mac_address() -> Result<Json<MacAddressResponse>, JsonApiError> {
    match host::first_mac_address() {
        Ok(mac_address) => Ok(Json(MacAddressResponse { mac_address })),
        Err(e) => {
            error!(error = %e, "mac address lookup failed");
            Err(JsonApiError::internal("Failed to get MAC address"))
        }
    }
}
