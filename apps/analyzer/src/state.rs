use crate::capabilities::Capabilities;
use crate::pipeline::Analyzer;
use crate::uploads::UploadStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub uploads: UploadStore,
    /// Snapshot taken at startup; reported by `/health`.
    pub capabilities: Capabilities,
}
