//! Service health report

use crate::providers::ServiceClients;
use crate::service::ServiceStatus;
use serde::Serialize;

/// Readiness of one configured provider
#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealth {
    pub role: &'static str,
    pub provider: String,
    /// `connected`, `not_configured` or `disabled`
    pub status: String,
}

/// Snapshot of the configured services. No network calls are made.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `healthy` when every provider can be called, `degraded` otherwise
    pub status: &'static str,
    pub timestamp: String,
    pub providers: Vec<ProviderHealth>,
}

impl HealthReport {
    pub fn check(clients: &ServiceClients) -> Self {
        let entries = [
            ("content", clients.content.name(), clients.content.status()),
            ("image", clients.image.name(), clients.image.status()),
        ];
        let healthy = entries
            .iter()
            .all(|(_, _, status)| *status == ServiceStatus::Available);

        Self {
            status: if healthy { "healthy" } else { "degraded" },
            timestamp: chrono::Utc::now().to_rfc3339(),
            providers: entries
                .into_iter()
                .map(|(role, provider, status)| ProviderHealth {
                    role,
                    provider: provider.to_string(),
                    status: status.to_string(),
                })
                .collect(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
