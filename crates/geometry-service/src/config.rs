use std::time::Duration;

use kernel_bridge::TessellationSpec;
use serde::{Deserialize, Serialize};

/// Service tunables. Everything here is configuration, not wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Idle time after which a client session is reaped.
    pub session_timeout_secs: u64,
    /// Maximum deviation between a surface and its triangulation.
    pub linear_tolerance: f64,
    /// Facet normal deviation bound, radians.
    pub angular_tolerance: f64,
    /// Session id used when a request carries no client metadata. All such
    /// callers share one session.
    pub default_client_id: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: 30 * 60,
            linear_tolerance: 0.1,
            angular_tolerance: 0.5,
            default_client_id: "default".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session_timeout_secs)
    }

    pub fn tessellation(&self) -> TessellationSpec {
        TessellationSpec {
            linear_tolerance: self.linear_tolerance,
            angular_tolerance: self.angular_tolerance,
        }
    }
}
