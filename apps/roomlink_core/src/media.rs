use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use tracing::info;
use uuid::Uuid;

/// A file part pulled out of a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Raster formats accepted for listing and profile pictures.
const IMAGE_MIME_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

impl Upload {
    /// Format sniffed from the leading bytes. The client's file name and
    /// Content-Type are never consulted.
    fn detected(&self) -> Option<infer::Type> {
        infer::get(&self.data).filter(|kind| IMAGE_MIME_TYPES.contains(&kind.mime_type()))
    }

    pub fn is_image(&self) -> bool {
        self.detected().is_some()
    }

    fn extension(&self) -> &'static str {
        self.detected().map_or("bin", |kind| kind.extension())
    }
}

/// Where uploaded pictures live. Rows only ever hold the opaque reference
/// returned by `save`.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, folder: &str, upload: &Upload) -> Result<String>;
    fn url(&self, reference: &str) -> String;
}

pub struct LocalImageStore {
    root: PathBuf,
    base_url: String,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self { root: root.into(), base_url: base_url.trim_end_matches('/').to_owned() }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, folder: &str, upload: &Upload) -> Result<String> {
        let reference = format!("{folder}/{}.{}", Uuid::new_v4(), upload.extension());
        let path = self.root.join(&reference);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        tokio::fs::write(&path, &upload.data)
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        info!(%reference, bytes = upload.data.len(), "stored upload");
        Ok(reference)
    }

    fn url(&self, reference: &str) -> String {
        format!("{}/{}", self.base_url, reference)
    }
}

/// Tera filter: `{{ listing.main_image | media_url }}`.
pub struct MediaUrlFilter(pub Arc<dyn ImageStore>);

impl tera::Filter for MediaUrlFilter {
    fn filter(
        &self,
        value: &tera::Value,
        _args: &HashMap<String, tera::Value>,
    ) -> tera::Result<tera::Value> {
        match value.as_str() {
            Some(reference) if !reference.is_empty() => {
                Ok(tera::Value::String(self.0.url(reference)))
            }
            _ => Ok(tera::Value::String(String::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>, ct: Option<&str>, data: &'static [u8]) -> Upload {
        Upload {
            file_name: name.map(str::to_owned),
            content_type: ct.map(str::to_owned),
            data: Bytes::from_static(data),
        }
    }

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = b"\xff\xd8\xff\xe0\0\x10JFIF\0";
    const GIF: &[u8] = b"GIF89a\x01\0\x01\0";
    const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

    #[test]
    fn image_detection_sniffs_content() {
        assert!(upload(Some("a.png"), Some("image/png"), PNG).is_image());
        assert!(upload(None, None, JPEG).is_image());
        assert!(upload(Some("a.txt"), Some("text/plain"), GIF).is_image());
        assert!(upload(Some("a"), Some("application/octet-stream"), WEBP).is_image());
        assert!(!upload(Some("a.png"), Some("image/png"), b"").is_image());
        assert!(!upload(Some("a.pdf"), Some("image/png"), b"%PDF-1.7").is_image());
    }

    #[test]
    fn declared_type_and_name_cannot_smuggle_markup() {
        let evil = upload(
            Some("evil.html"),
            Some("image/png"),
            b"<script>alert(document.cookie)</script>",
        );
        assert!(!evil.is_image());
        assert_eq!(evil.extension(), "bin");
    }

    #[test]
    fn extension_follows_detected_format() {
        assert_eq!(upload(Some("evil.html"), Some("text/html"), PNG).extension(), "png");
        assert_eq!(upload(Some("front.gif"), Some("image/gif"), JPEG).extension(), "jpg");
        assert_eq!(upload(None, None, GIF).extension(), "gif");
        assert_eq!(upload(None, None, WEBP).extension(), "webp");
    }

    #[tokio::test]
    async fn local_store_writes_under_folder() {
        let root = std::env::temp_dir().join(format!("roomlink-media-{}", Uuid::new_v4()));
        let store = LocalImageStore::new(&root, "/media/");

        let reference = store
            .save("listing_images", &upload(Some("front.html"), Some("text/html"), JPEG))
            .await
            .unwrap();

        assert!(reference.starts_with("listing_images/"));
        assert!(reference.ends_with(".jpg"));
        assert_eq!(tokio::fs::read(root.join(&reference)).await.unwrap(), JPEG);
        assert_eq!(store.url(&reference), format!("/media/{reference}"));

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
