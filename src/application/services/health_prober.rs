use std::sync::Arc;

use serde::Serialize;

use crate::application::ports::{AsrClient, JobRepository};

pub const BUSY_SERVICE_MESSAGE: &str =
    "transcription service unreachable but there are running transcriptions";
pub const UNAVAILABLE_MESSAGE: &str = "transcription service unavailable";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthProbe {
    pub healthy: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub status: ServiceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub service_message: String,
}

/// Checks the speech recognition service, falling back to running-job state
/// because the service answers one request at a time and goes quiet while it
/// transcribes.
pub struct HealthProber {
    asr_client: Arc<dyn AsrClient>,
    job_repository: Arc<dyn JobRepository>,
}

impl HealthProber {
    pub fn new(asr_client: Arc<dyn AsrClient>, job_repository: Arc<dyn JobRepository>) -> Self {
        Self {
            asr_client,
            job_repository,
        }
    }

    pub async fn probe(&self) -> HealthProbe {
        match self.asr_client.health().await {
            Ok(response) => {
                let message = if response.body.is_empty() {
                    format!("status {} with empty body", response.status)
                } else {
                    response.body
                };
                HealthProbe {
                    healthy: response.success,
                    message,
                }
            }
            Err(e) => HealthProbe {
                healthy: false,
                message: e.to_string(),
            },
        }
    }

    pub async fn service_status(&self) -> ServiceStatus {
        let probe = self.probe().await;
        if probe.healthy {
            return ServiceStatus {
                status: ServiceState::Ok,
                error: None,
                service_message: probe.message,
            };
        }

        let running = match self.job_repository.list_running().await {
            Ok(jobs) => jobs.len(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list running jobs for status check");
                0
            }
        };

        if running > 0 {
            tracing::debug!(
                running,
                probe_message = %probe.message,
                "Health check failed but running transcriptions found"
            );
            return ServiceStatus {
                status: ServiceState::Ok,
                error: None,
                service_message: BUSY_SERVICE_MESSAGE.to_string(),
            };
        }

        tracing::warn!(probe_message = %probe.message, "Transcription service unavailable");
        ServiceStatus {
            status: ServiceState::Error,
            error: Some(UNAVAILABLE_MESSAGE.to_string()),
            service_message: probe.message,
        }
    }
}
