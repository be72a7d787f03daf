//! Error types shared across the zonal analysis services.

use thiserror::Error;

/// Result type alias using ZonalError.
pub type ZonalResult<T> = Result<T, ZonalError>;

/// Request-level error type for the analysis services.
#[derive(Debug, Error)]
pub enum ZonalError {
    // === Request validation ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    // === Routing ===
    #[error("Geometry too large for direct analysis: {area_ha:.0} ha exceeds {limit_ha:.0} ha")]
    AreaTooLarge { area_ha: f64, limit_ha: f64 },

    #[error("Geostore entry not found: {0}")]
    GeostoreNotFound(String),

    // === Data ===
    #[error("Data not available: {0}")]
    DataNotAvailable(String),

    // === Infrastructure ===
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ZonalError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ZonalError::MissingParameter(_)
            | ZonalError::InvalidParameter { .. }
            | ZonalError::InvalidGeometry(_) => 400,

            ZonalError::GeostoreNotFound(_) | ZonalError::DataNotAvailable(_) => 404,

            ZonalError::AreaTooLarge { .. } => 413,

            _ => 500,
        }
    }
}

impl From<std::io::Error> for ZonalError {
    fn from(err: std::io::Error) -> Self {
        ZonalError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for ZonalError {
    fn from(err: serde_json::Error) -> Self {
        ZonalError::InternalError(format!("JSON error: {}", err))
    }
}
