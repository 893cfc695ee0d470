use std::path::PathBuf;

use super::{check_upload, Bucket, MediaStore, Upload};

/// Files under `<root>/<bucket>/`, served by the `/uploads` file server.
pub struct LocalMedia {
    root: PathBuf,
}

impl LocalMedia {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MediaStore for LocalMedia {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn upload(&self, bucket: Bucket, file: &Upload) -> Result<String, String> {
        let name = check_upload(file)?;
        let dir = self.root.join(bucket.name());
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
        let dest = dir.join(&name);
        std::fs::write(&dest, &file.bytes)
            .map_err(|e| format!("Failed to write {}: {}", dest.display(), e))?;
        Ok(format!("/uploads/{}/{}", bucket.name(), name))
    }
}
