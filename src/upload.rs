//! Image upload collaborator: given a file, return a URL.
//!
//! The core never cares where image bytes end up; it hands them to an
//! `ImageStore` and records the returned URLs on the listing. The disk
//! implementation writes under the configured upload directory, which the
//! server exposes at `/uploads`.

use anyhow::Context;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where uploaded images go. Implementations return a publicly servable URL.
pub trait ImageStore: Send + Sync {
    fn save(&self, original_name: &str, bytes: &[u8]) -> anyhow::Result<String>;
}

/// Stores images on the local filesystem under one directory.
pub struct DiskImageStore {
    root: PathBuf,
}

impl DiskImageStore {
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create upload dir {}", root.display()))?;
        Ok(Self { root })
    }
}

/// Keep the original extension when it looks sane, fall back to jpg.
fn safe_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 5 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "jpg".to_string())
}

impl ImageStore for DiskImageStore {
    fn save(&self, original_name: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let name = format!("{}.{}", Uuid::new_v4(), safe_extension(original_name));
        let path = self.root.join(&name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write image {}", path.display()))?;
        Ok(format!("/uploads/{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_writes_file_and_returns_url() {
        let dir = tempdir().unwrap();
        let store = DiskImageStore::new(dir.path()).unwrap();

        let url = store.save("lobby.PNG", b"fake image bytes").unwrap();
        assert!(url.starts_with("/uploads/"));
        assert!(url.ends_with(".png"));

        let on_disk = dir.path().join(url.trim_start_matches("/uploads/"));
        assert_eq!(std::fs::read(on_disk).unwrap(), b"fake image bytes");
    }

    #[test]
    fn test_suspicious_extension_falls_back() {
        assert_eq!(safe_extension("weird.ex!t"), "jpg");
        assert_eq!(safe_extension("noext"), "jpg");
        assert_eq!(safe_extension("photo.jpeg"), "jpeg");
    }
}
