use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};
use tracing::debug;

use crate::util::write_bytes;

pub const ORIGINAL_REPORTS_BUCKET: &str = "report-storage";
pub const ANALYTICS_BUCKET: &str = "teamlead-reports";

/// Named byte blobs grouped in buckets, each reachable by a public URL.
pub trait BlobStore {
    fn upload(&self, bucket: &str, name: &str, bytes: &[u8], upsert: bool) -> Result<()>;

    fn public_url(&self, bucket: &str, name: &str) -> String;
}

/// Buckets as directories under a root. URLs use the configured public base
/// when there is one and `file://` paths otherwise.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: Option<String>,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: Option<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    fn object_path(&self, bucket: &str, name: &str) -> Result<PathBuf> {
        for part in [bucket, name] {
            let path = Path::new(part);
            let is_plain = !part.is_empty()
                && path
                    .components()
                    .all(|component| matches!(component, Component::Normal(_)));
            if !is_plain {
                bail!("invalid object name: {bucket}/{name}");
            }
        }

        Ok(self.root.join(bucket).join(name))
    }
}

impl BlobStore for LocalBlobStore {
    fn upload(&self, bucket: &str, name: &str, bytes: &[u8], upsert: bool) -> Result<()> {
        let path = self.object_path(bucket, name)?;
        if !upsert && path.exists() {
            bail!("object already exists: {bucket}/{name}");
        }

        write_bytes(&path, bytes)?;
        debug!(bucket, name, bytes = bytes.len(), "uploaded object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        match &self.public_base_url {
            Some(base) => format!("{base}/storage/v1/object/public/{bucket}/{name}"),
            None => format!("file://{}", self.root.join(bucket).join(name).display()),
        }
    }
}
