//! Guild-scoped image store on local disk.
//!
//! Layout: `<root>/<module>/<guild_id>/<millis>-<rand>.<ext>` (kiss images
//! use a `kiss_` prefix under `kiss-images/`). Files are validated by
//! extension, mapped MIME type, and a per-module size cap before anything is
//! written; a download that fails validation after the fact is removed again.
//! Deletion is best-effort and deleting a missing file is not an error.

use crate::errors::{Error, Result};
use rand::Rng;
use std::path::PathBuf;
use tracing::{error, warn};

/// Which feature a file belongs to; decides subdirectory, size cap, and
/// accepted types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// Food images
    Foods,
    /// Category images
    Categories,
    /// Kiss command images
    Kiss,
}

impl ModuleKind {
    /// Subdirectory under the upload root.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Foods => "foods",
            Self::Categories => "categories",
            Self::Kiss => "kiss-images",
        }
    }

    /// Maximum accepted file size in bytes.
    #[must_use]
    pub const fn max_bytes(self) -> u64 {
        match self {
            Self::Foods | Self::Kiss => 5 * 1024 * 1024,
            Self::Categories => 2 * 1024 * 1024,
        }
    }

    /// MIME types accepted for this module.
    #[must_use]
    pub const fn allowed_mime(self) -> &'static [&'static str] {
        match self {
            Self::Foods => &["image/jpeg", "image/png", "image/webp"],
            Self::Categories => &["image/jpeg", "image/png"],
            Self::Kiss => &["image/jpeg", "image/png", "image/webp", "image/gif"],
        }
    }
}

/// MIME type for a known image extension (without the dot, lowercase).
#[must_use]
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// Extracts the lowercase file extension from a file name or URL, ignoring
/// any query string.
#[must_use]
pub fn extension_of(url_or_name: &str) -> Option<String> {
    let without_query = url_or_name.split(['?', '#']).next().unwrap_or_default();
    let file_name = without_query.rsplit('/').next().unwrap_or_default();
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Disk-backed image store rooted at the configured upload directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Creates a store rooted at `root`. Directories are created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path of a stored file given its relative path.
    #[must_use]
    pub fn full_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Validates an extension against a module's accepted types.
    ///
    /// # Errors
    /// Returns [`Error::InvalidUpload`] for unknown or disallowed types.
    pub fn validate_extension(module: ModuleKind, ext: &str) -> Result<&'static str> {
        let mime = mime_for_extension(ext).ok_or_else(|| Error::InvalidUpload {
            reason: format!("unsupported file extension .{ext}"),
        })?;
        if !module.allowed_mime().contains(&mime) {
            return Err(Error::InvalidUpload {
                reason: format!("{mime} files are not allowed here"),
            });
        }
        Ok(mime)
    }

    fn new_file_name(module: ModuleKind, ext: &str) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let rand: u32 = rand::thread_rng().gen();
        match module {
            ModuleKind::Kiss => format!("kiss_{millis}-{rand:08x}.{ext}"),
            _ => format!("{millis}-{rand:08x}.{ext}"),
        }
    }

    /// Writes validated bytes for a guild and returns the relative path.
    ///
    /// # Errors
    /// Returns [`Error::InvalidUpload`] on a failed type or size check, or an
    /// I/O error if the write fails.
    pub async fn save_bytes(
        &self,
        module: ModuleKind,
        guild_id: &str,
        ext: &str,
        bytes: &[u8],
    ) -> Result<String> {
        Self::validate_extension(module, ext)?;
        if bytes.len() as u64 > module.max_bytes() {
            return Err(Error::InvalidUpload {
                reason: format!(
                    "file too large, maximum is {} MB",
                    module.max_bytes() / (1024 * 1024)
                ),
            });
        }

        let dir = self.root.join(module.dir()).join(guild_id);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = Self::new_file_name(module, ext);
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        Ok(format!("{}/{guild_id}/{file_name}", module.dir()))
    }

    /// Downloads an attachment URL, validates it, and stores it for a guild.
    ///
    /// # Errors
    /// Returns [`Error::InvalidUpload`] for bad type or size, [`Error::Http`]
    /// for a failed download, or an I/O error on write.
    pub async fn save_from_url(
        &self,
        client: &reqwest::Client,
        module: ModuleKind,
        guild_id: &str,
        url: &str,
    ) -> Result<String> {
        let ext = extension_of(url).ok_or_else(|| Error::InvalidUpload {
            reason: "file has no recognizable extension".to_string(),
        })?;
        Self::validate_extension(module, &ext)?;

        let response = client.get(url).send().await?.error_for_status()?;
        if let Some(length) = response.content_length() {
            if length > module.max_bytes() {
                return Err(Error::InvalidUpload {
                    reason: format!(
                        "file too large, maximum is {} MB",
                        module.max_bytes() / (1024 * 1024)
                    ),
                });
            }
        }
        let bytes = response.bytes().await?;

        self.save_bytes(module, guild_id, &ext, &bytes).await
    }

    /// Removes a stored file. Returns whether a file was actually deleted;
    /// a missing file or failed unlink only logs.
    pub async fn delete(&self, relative: &str) -> bool {
        let path = self.full_path(relative);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                error!("Failed to delete {}: {e}", path.display());
                false
            }
        }
    }

    /// File names of all kiss images stored for a guild, sorted.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read (a missing directory
    /// yields an empty list).
    pub async fn list_kiss_images(&self, guild_id: &str) -> Result<Vec<String>> {
        let dir = self.root.join(ModuleKind::Kiss.dir()).join(guild_id);
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Relative path of a kiss image file for a guild.
    #[must_use]
    pub fn kiss_relative(guild_id: &str, file_name: &str) -> String {
        format!("{}/{guild_id}/{file_name}", ModuleKind::Kiss.dir())
    }

    /// Picks a random stored kiss image for a guild, if any exist.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read.
    pub async fn random_kiss_image(&self, guild_id: &str) -> Result<Option<String>> {
        let names = self.list_kiss_images(guild_id).await?;
        if names.is_empty() {
            return Ok(None);
        }
        let idx = rand::thread_rng().gen_range(0..names.len());
        Ok(Some(names[idx].clone()))
    }

    /// Deletes every kiss image of a guild, returning how many were removed.
    pub async fn remove_all_kiss_images(&self, guild_id: &str) -> usize {
        let names = match self.list_kiss_images(guild_id).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list kiss images for guild {guild_id}: {e}");
                return 0;
            }
        };
        let mut removed = 0;
        for name in names {
            if self.delete(&Self::kiss_relative(guild_id, &name)).await {
                removed += 1;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::temp_upload_store;

    #[test]
    fn test_extension_is_parsed_from_urls_with_query_strings() {
        assert_eq!(
            extension_of("https://cdn.example.com/a/b/photo.PNG?ex=123&is=456"),
            Some("png".to_string())
        );
        assert_eq!(extension_of("snack.jpeg"), Some("jpeg".to_string()));
        assert_eq!(extension_of("https://cdn.example.com/noext"), None);
        assert_eq!(extension_of(".hidden"), None);
    }

    #[test]
    fn test_disallowed_types_are_rejected_per_module() {
        assert!(UploadStore::validate_extension(ModuleKind::Foods, "png").is_ok());
        assert!(UploadStore::validate_extension(ModuleKind::Foods, "pdf").is_err());
        // gif is fine for kiss images but not for foods
        assert!(UploadStore::validate_extension(ModuleKind::Kiss, "gif").is_ok());
        assert!(UploadStore::validate_extension(ModuleKind::Foods, "gif").is_err());
    }

    #[tokio::test]
    async fn test_save_bytes_writes_under_module_and_guild() -> crate::errors::Result<()> {
        let store = temp_upload_store();

        let relative = store
            .save_bytes(ModuleKind::Foods, "guild-a", "png", b"not-really-a-png")
            .await?;

        assert!(relative.starts_with("foods/guild-a/"));
        assert!(relative.ends_with(".png"));
        let on_disk = tokio::fs::read(store.full_path(&relative)).await?;
        assert_eq!(on_disk, b"not-really-a-png");
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_payload_is_rejected() {
        let store = temp_upload_store();
        let too_big = vec![0_u8; (ModuleKind::Categories.max_bytes() + 1) as usize];

        let result = store
            .save_bytes(ModuleKind::Categories, "guild-a", "png", &too_big)
            .await;

        assert!(matches!(result, Err(Error::InvalidUpload { .. })));
    }

    #[tokio::test]
    async fn test_delete_is_best_effort() -> crate::errors::Result<()> {
        let store = temp_upload_store();
        let relative = store
            .save_bytes(ModuleKind::Foods, "guild-a", "jpg", b"x")
            .await?;

        assert!(store.delete(&relative).await);
        // Second delete finds nothing and does not error
        assert!(!store.delete(&relative).await);
        assert!(!store.delete("foods/guild-a/never-existed.png").await);
        Ok(())
    }

    #[tokio::test]
    async fn test_kiss_image_listing_and_removal() -> crate::errors::Result<()> {
        let store = temp_upload_store();
        assert!(store.list_kiss_images("guild-a").await?.is_empty());

        store
            .save_bytes(ModuleKind::Kiss, "guild-a", "png", b"a")
            .await?;
        store
            .save_bytes(ModuleKind::Kiss, "guild-a", "gif", b"b")
            .await?;
        store
            .save_bytes(ModuleKind::Kiss, "guild-b", "png", b"c")
            .await?;

        let names = store.list_kiss_images("guild-a").await?;
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|n| n.starts_with("kiss_")));

        let picked = store.random_kiss_image("guild-a").await?.unwrap();
        assert!(names.contains(&picked));

        assert_eq!(store.remove_all_kiss_images("guild-a").await, 2);
        assert!(store.list_kiss_images("guild-a").await?.is_empty());
        // Other guilds untouched
        assert_eq!(store.list_kiss_images("guild-b").await?.len(), 1);
        Ok(())
    }
}
