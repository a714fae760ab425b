use serde::Deserialize;

use crate::{UniFiError, UniFiResult};

/// Standard API response envelope from the UniFi controller.
///
/// Every endpoint wraps its payload as `{ meta: { rc, msg }, data: [...] }`.
/// The absence of a metadata error means the call succeeded at the protocol
/// level even if `data` is empty; how many records are acceptable is decided
/// by each caller through [`ApiResponse::into_data`] (any) or
/// [`ApiResponse::into_single`] (exactly one).
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Metadata about the response.
    pub meta: ApiMeta,

    /// The records returned. Missing `data` decodes as empty.
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> ApiResponse<T> {
    /// Unwraps the envelope with no cardinality expectation.
    ///
    /// A metadata error classifies as [`UniFiError::ApiError`]; otherwise
    /// the full data sequence is returned, empty or not.
    pub fn into_data(self) -> UniFiResult<Vec<T>> {
        if let Some(msg) = self.meta.error_message() {
            return Err(UniFiError::ApiError(msg));
        }
        Ok(self.data)
    }

    /// Unwraps the envelope expecting exactly one record.
    ///
    /// A metadata error takes priority over the cardinality check. With no
    /// metadata error, any length other than one (including an anomalous
    /// multi-record response) classifies as [`UniFiError::NotFound`] rather
    /// than silently picking the first record.
    pub fn into_single(self) -> UniFiResult<T> {
        let mut data = self.into_data()?;
        if data.len() != 1 {
            return Err(UniFiError::NotFound);
        }
        Ok(data.remove(0))
    }
}

/// Metadata about an API response.
#[derive(Debug, Deserialize)]
pub struct ApiMeta {
    /// Result code. "ok" indicates success.
    pub rc: String,

    /// Error message, if any.
    pub msg: Option<String>,
}

impl ApiMeta {
    /// Returns the controller-reported error message, if the metadata
    /// carries one.
    ///
    /// Controllers signal failure with `rc != "ok"`; `msg` holds the
    /// human-readable reason and is surfaced verbatim when present.
    pub fn error_message(&self) -> Option<String> {
        if self.rc == "ok" {
            return None;
        }
        Some(
            self.msg
                .clone()
                .unwrap_or_else(|| format!("rc={}", self.rc)),
        )
    }
}

/// Empty response type for endpoints that don't return meaningful data
#[derive(Debug, Deserialize)]
pub struct EmptyResponse {}
