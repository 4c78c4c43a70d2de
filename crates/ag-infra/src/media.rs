use std::path::Path;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use tracing::debug;

use ag_core::ports::{ImageEncodeError, ImageEncoderPort};

/// Reads picked image files and inlines them as base64 data URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileImageEncoder;

fn mime_of(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

/// Sniffs the image format from its magic bytes and builds the data URL.
pub fn to_data_url(bytes: &[u8], origin: &Path) -> Result<String, ImageEncodeError> {
    let unsupported = || ImageEncodeError::UnsupportedFormat(origin.display().to_string());
    let format = image::guess_format(bytes).map_err(|_| unsupported())?;
    let mime = mime_of(format).ok_or_else(unsupported)?;
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
}

#[async_trait]
impl ImageEncoderPort for FileImageEncoder {
    async fn encode_data_url(&self, path: &Path) -> Result<String, ImageEncodeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ImageEncodeError::Read {
                path: path.display().to_string(),
                source,
            })?;
        debug!(path = %path.display(), size = bytes.len(), "encoding image");
        to_data_url(&bytes, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[tokio::test]
    async fn png_becomes_data_url() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PNG_MAGIC).unwrap();

        let url = FileImageEncoder.encode_data_url(file.path()).await.unwrap();

        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(
            STANDARD
                .decode(url.trim_start_matches("data:image/png;base64,"))
                .unwrap(),
            PNG_MAGIC
        );
    }

    #[tokio::test]
    async fn text_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"not an image").unwrap();

        let err = FileImageEncoder.encode_data_url(file.path()).await.unwrap_err();

        assert!(matches!(err, ImageEncodeError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = FileImageEncoder
            .encode_data_url(Path::new("/nonexistent/id.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageEncodeError::Read { .. }));
    }
}
