//! Service files API client

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use tokio::fs;

use crate::errors::DeployError;
use crate::http::client::HttpClient;
use crate::models::UploadedFile;

impl HttpClient {
    /// Get files stored for a service
    pub async fn get_service_files(&self, service_id: &str) -> Result<Vec<UploadedFile>, DeployError> {
        let url = self.url(&["services", service_id, "files"]);
        let response: openapi_client::Files = self.get(url, &[]).await?;
        Ok(response.files.into_iter().map(UploadedFile::from).collect())
    }

    /// Upload a file as a multipart stream
    pub async fn create_service_file(
        &self,
        service_id: &str,
        file: fs::File,
        file_name: &str,
        size: u64,
    ) -> Result<UploadedFile, DeployError> {
        let url = self.url(&["services", service_id, "files"]);
        let part = Part::stream_with_length(Body::from(file), size)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("file", part);

        let response: openapi_client::Files = self.post_multipart(url, form).await?;
        response
            .files
            .into_iter()
            .next()
            .map(UploadedFile::from)
            .ok_or_else(|| {
                DeployError::Backend(format!("No file returned after uploading {}", file_name))
            })
    }
}
