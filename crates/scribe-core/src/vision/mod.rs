//! Image analysis adapter.
//!
//! The vision service is reached through the `VisionAnalyzer` trait so the
//! batch driver never depends on a concrete vendor client.

mod azure;

pub use azure::AzureVisionClient;

use crate::error::VisionServiceError;
use crate::types::AnalysisResult;
use async_trait::async_trait;
use std::path::Path;

/// Anything that can turn an image file into an `AnalysisResult`.
///
/// Uses `async_trait` because the driver holds `&dyn VisionAnalyzer`.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Analyze one image. Every call reaches the service; nothing is cached.
    async fn analyze(&self, image_path: &Path) -> Result<AnalysisResult, VisionServiceError>;
}
