use std::sync::Arc;

use super::{check_upload, Bucket, MediaStore, Upload};
use crate::hosted::HostedClient;

/// Object upload to the hosted service's storage API.
pub struct HostedMedia {
    client: Arc<HostedClient>,
}

impl HostedMedia {
    pub fn new(client: Arc<HostedClient>) -> Self {
        Self { client }
    }
}

impl MediaStore for HostedMedia {
    fn backend_name(&self) -> &'static str {
        "hosted"
    }

    fn upload(&self, bucket: Bucket, file: &Upload) -> Result<String, String> {
        let name = check_upload(file)?;
        let url = self
            .client
            .endpoint(&format!("/storage/v1/object/{}/{}", bucket.name(), name))?;
        let content_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let req = self
            .client
            .post(url)
            .header("Content-Type", content_type)
            .header("Cache-Control", "max-age=3600")
            .header("x-upsert", "false")
            .body(file.bytes.clone());
        self.client
            .send(req, &format!("Upload to {}", bucket.name()))?;
        self.client.public_object_url(bucket.name(), &name)
    }
}
