use serde::{Deserialize, Serialize};

use crate::orchestrator::OrchestratorConfig;
use crate::services::ServiceEndpoint;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub services: ServicesConfig,
}

/// Collaborator endpoints. Every service is optional; a submission that
/// requests enrichment from an unconfigured service simply runs with the
/// orchestrator's injected implementation for that service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServicesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<ServiceEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<ServiceEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech: Option<ServiceEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_parser: Option<ServiceEndpoint>,
}
