//! Device position source.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A one-shot position fix in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Accuracy radius in meters, when known.
    pub accuracy_m: Option<f64>,
}

/// The three distinguished ways a position request can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// The user refused location access.
    #[error("permission denied")]
    PermissionDenied,
    /// No fix within the timeout.
    #[error("timed out")]
    Timeout,
    /// Anything else.
    #[error("position unavailable: {0}")]
    Unavailable(String),
}

impl GeoError {
    /// Fixed user-facing message for this outcome.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Location permission denied. Allow location access to fill in coordinates."
            }
            Self::Timeout => "Location request timed out. Try again in an open area.",
            Self::Unavailable(_) => "Unable to determine your location.",
        }
    }
}

/// High-accuracy, one-shot position provider.
#[async_trait]
pub trait PositionSource: Send + Sync + 'static {
    /// Request the current position, failing with [`GeoError::Timeout`]
    /// when no fix arrives within `timeout`.
    async fn current_position(&self, timeout: Duration) -> Result<Position, GeoError>;
}
