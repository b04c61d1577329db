//! Host network identity.

use mac_address::{MacAddress, MacAddressIterator};

use crate::errors::ServiceError;

/// Reported when no interface carries a usable hardware address.
pub const NO_MAC_FOUND: &str = "No valid MAC address found";

/// First non-null MAC address in OS interface order, lowercase, or [`NO_MAC_FOUND`].
pub fn first_mac_address() -> Result<String, ServiceError> {
    let addrs = MacAddressIterator::new().map_err(|e| ServiceError::Internal(e.to_string()))?;
    Ok(first_valid(addrs).unwrap_or_else(|| NO_MAC_FOUND.to_string()))
}

/// Skip `00:00:00:00:00:00` placeholders (loopback and friends); first match wins.
pub fn first_valid<I>(addrs: I) -> Option<String>
where
    I: IntoIterator<Item = MacAddress>,
{
    addrs
        .into_iter()
        .find(|mac| mac.bytes() != [0u8; 6])
        .map(|mac| mac.to_string().to_lowercase())
}
