//! League client (LCU) local API: credential discovery, the HTTPS client
//! and typed helpers for the endpoints the monitors use.

pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod models;

use crate::error::AppError;
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq)]
pub struct LcuResponse {
    pub status: u16,
    pub body: String,
}

impl LcuResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_str(&self.body)
            .map_err(|e| AppError::JsonError(format!("unexpected LCU payload: {}", e)))
    }
}

/// A non-2xx status is returned as data; only transport failures are errors.
pub trait LcuApi {
    fn request(&self, method: &str, endpoint: &str, body: Option<&str>) -> Result<LcuResponse, AppError>;
}
