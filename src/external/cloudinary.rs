use crate::config::CloudinaryConfig;
use crate::error::{AppError, AppResult};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAsset {
    pub public_id: String,
    pub secure_url: String,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: CloudinaryErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetail {
    message: String,
}

/// Unsigned uploads of payment proof images to Cloudinary.
#[derive(Clone)]
pub struct CloudinaryService {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryService {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.cloud_name.is_empty() && !self.config.upload_preset.is_empty()
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    fn folder_for(&self, sub_folder: &str) -> String {
        if sub_folder.is_empty() {
            self.config.folder.clone()
        } else {
            format!("{}/{}", self.config.folder, sub_folder.trim_matches('/'))
        }
    }

    /// `file` is a data URI or a remote URL; Cloudinary accepts both as a form field.
    pub async fn upload_image(&self, file: &str, sub_folder: &str) -> AppResult<UploadedAsset> {
        if !self.is_configured() {
            return Err(AppError::ConfigError(
                "Cloudinary cloud_name/upload_preset are not configured".to_string(),
            ));
        }
        if file.trim().is_empty() {
            return Err(AppError::ValidationError("Upload file is empty".to_string()));
        }

        let folder = self.folder_for(sub_folder);
        let params = [
            ("file", file),
            ("upload_preset", self.config.upload_preset.as_str()),
            ("folder", folder.as_str()),
        ];

        let response = self
            .client
            .post(self.upload_url())
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            let asset: UploadedAsset = response.json().await?;
            log::info!("Uploaded asset to Cloudinary: {}", asset.public_id);
            Ok(asset)
        } else {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<CloudinaryErrorBody>(&error_text)
                .map(|b| b.error.message)
                .unwrap_or(error_text);
            log::error!("Cloudinary upload failed ({status}): {message}");
            Err(AppError::ExternalApiError(format!(
                "Image upload failed: {message}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> CloudinaryService {
        CloudinaryService::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            upload_preset: "unsigned".to_string(),
            folder: "fitdesk".to_string(),
            base_url: "https://api.cloudinary.com/".to_string(),
        })
    }

    #[test]
    fn test_upload_url_and_folder() {
        let svc = service();
        assert_eq!(
            svc.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
        assert_eq!(svc.folder_for("iron-gym/payments"), "fitdesk/iron-gym/payments");
        assert_eq!(svc.folder_for(""), "fitdesk");
    }

    #[test]
    fn test_parse_upload_response() {
        let body = r#"{
            "public_id": "fitdesk/iron-gym/payments/abc123",
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/abc123.jpg",
            "bytes": 48211,
            "format": "jpg",
            "width": 800
        }"#;
        let asset: UploadedAsset = serde_json::from_str(body).unwrap();
        assert_eq!(asset.public_id, "fitdesk/iron-gym/payments/abc123");
        assert!(asset.secure_url.ends_with("abc123.jpg"));
    }

    #[tokio::test]
    async fn test_upload_requires_configuration() {
        let svc = CloudinaryService::new(CloudinaryConfig::default());
        assert!(!svc.is_configured());
        let err = svc.upload_image("data:image/png;base64,AAAA", "x").await;
        assert!(matches!(err, Err(AppError::ConfigError(_))));
    }
}
