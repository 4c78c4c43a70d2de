use std::path::Path;

use async_trait::async_trait;

use super::errors::ImageEncodeError;

/// Turns a picked image file into a `data:<mime>;base64,...` URL.
///
/// No compression and no size cap: the backend decides what it accepts.
#[async_trait]
pub trait ImageEncoderPort: Send + Sync {
    async fn encode_data_url(&self, path: &Path) -> Result<String, ImageEncodeError>;
}
