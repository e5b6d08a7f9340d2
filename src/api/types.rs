//! Shared state for the HTTP trigger surface.

use std::sync::Arc;

use crate::pipeline::lease::DocumentLeases;
use crate::pipeline::PipelineContext;

/// Everything a handler needs: the pipeline dependencies, the per-document
/// lease registry, and the optional worker auth token.
#[derive(Clone)]
pub struct ApiContext {
    pub pipeline: Arc<PipelineContext>,
    pub leases: Arc<DocumentLeases>,
    /// When set, every trigger route requires `Authorization: Bearer <token>`.
    pub auth_token: Option<Arc<str>>,
}

impl ApiContext {
    pub fn new(pipeline: Arc<PipelineContext>, auth_token: Option<String>) -> Self {
        Self {
            pipeline,
            leases: Arc::new(DocumentLeases::new()),
            auth_token: auth_token.map(Arc::from),
        }
    }
}
