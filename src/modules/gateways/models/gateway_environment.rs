use serde::{Deserialize, Serialize};

/// Gateway deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayEnvironment {
    Sandbox,
    Production,
}

impl GatewayEnvironment {
    /// Fixed API root for this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            GatewayEnvironment::Sandbox => "https://cybqa.pesapal.com/pesapalv3",
            GatewayEnvironment::Production => "https://pay.pesapal.com/v3",
        }
    }
}

impl std::fmt::Display for GatewayEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayEnvironment::Sandbox => write!(f, "sandbox"),
            GatewayEnvironment::Production => write!(f, "production"),
        }
    }
}
