use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "heic", "pdf"];

/// A photo submitted inline with a form, base64 encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub data: String,
}

impl Attachment {
    /// Lower-cased extension of the original file name, if it is an accepted image/document type.
    pub fn extension(&self) -> AppResult<String> {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| AppError::Upload(format!("File {} has no extension", self.file_name)))?;

        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(AppError::Upload(format!("Unsupported file type: .{}", ext)));
        }

        Ok(ext)
    }

    pub fn decode(&self) -> AppResult<Vec<u8>> {
        // Browsers hand out data URLs; accept both forms.
        let payload = match self.data.split_once(";base64,") {
            Some((_, rest)) => rest,
            None => self.data.as_str(),
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| AppError::Upload(format!("Invalid attachment encoding: {}", e)))?;

        if bytes.is_empty() {
            return Err(AppError::Upload("Attachment is empty".to_string()));
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str, data: &str) -> Attachment {
        Attachment {
            file_name: name.to_string(),
            content_type: None,
            data: data.to_string(),
        }
    }

    #[test]
    fn test_decode_plain_and_data_url() {
        let plain = attachment("receipt.jpg", "aGVsbG8=");
        assert_eq!(plain.decode().unwrap(), b"hello");

        let data_url = attachment("receipt.jpg", "data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(data_url.decode().unwrap(), b"hello");
    }

    #[test]
    fn test_rejects_bad_payloads() {
        assert!(matches!(
            attachment("receipt.jpg", "***").decode(),
            Err(AppError::Upload(_))
        ));
        assert!(matches!(
            attachment("receipt.jpg", "").decode(),
            Err(AppError::Upload(_))
        ));
    }

    #[test]
    fn test_extension_whitelist() {
        assert_eq!(attachment("Odometer.PNG", "").extension().unwrap(), "png");
        assert!(attachment("script.sh", "").extension().is_err());
        assert!(attachment("noext", "").extension().is_err());
    }
}
