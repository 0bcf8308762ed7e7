//! Asset bundle extraction and removal.

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::core::error::{EmojiError, EmojiResult};

/// Unpack a zip bundle into `dest`, keeping only files ending in `ext`
///
/// Archive directories are flattened: each kept file lands in `dest` under its
/// basename. When two entries share a basename the first one wins. Returns
/// the number of files written.
pub async fn extract_bundle(bytes: Vec<u8>, dest: &Path, ext: &str) -> EmojiResult<usize> {
    let dest = dest.to_path_buf();
    let ext = ext.to_string();

    tokio::task::spawn_blocking(move || extract_sync(&bytes, &dest, &ext))
        .await
        .map_err(|e| EmojiError::parse("asset bundle", e))?
}

fn extract_sync(bytes: &[u8], dest: &Path, ext: &str) -> EmojiResult<usize> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| EmojiError::parse("asset bundle", e))?;

    fs::create_dir_all(dest).map_err(|e| EmojiError::io(dest, e))?;

    let mut written = HashSet::new();
    let mut duplicates = 0usize;

    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| EmojiError::parse("asset bundle", e))?;
        if file.is_dir() {
            continue;
        }

        let Some(name) = file
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        else {
            warn!("Skipping unsafe archive entry: {}", file.name());
            continue;
        };
        if !name.ends_with(ext) {
            continue;
        }
        if !written.insert(name.clone()) {
            duplicates += 1;
            continue;
        }

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)
            .map_err(|e| EmojiError::parse(format!("asset bundle entry {name}"), e))?;

        let target = dest.join(&name);
        fs::write(&target, content).map_err(|e| EmojiError::io(&target, e))?;
    }

    if duplicates > 0 {
        debug!("Ignored {} entries with duplicate file names", duplicates);
    }
    info!("Extracted {} files into {}", written.len(), dest.display());

    Ok(written.len())
}

/// Delete a set's asset directory and everything in it
pub async fn remove_asset_dir(dir: &Path) -> EmojiResult<PathBuf> {
    if !async_fs::try_exists(dir)
        .await
        .map_err(|e| EmojiError::io(dir, e))?
    {
        return Err(EmojiError::NotFound(format!(
            "Asset directory {}",
            dir.display()
        )));
    }

    async_fs::remove_dir_all(dir)
        .await
        .map_err(|e| EmojiError::io(dir, e))?;
    info!("Removed {}", dir.display());

    Ok(dir.to_path_buf())
}


#[cfg(test)]
mod tests {
    use super::testing::zip_of;
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extract_flattens_and_filters() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("public/emoji/twemoji");
        let bundle = zip_of(&[
            ("twemoji-14.0.2/", ""),
            ("twemoji-14.0.2/assets/svg/1f600.svg", "<svg/>"),
            ("twemoji-14.0.2/assets/svg/1f44b-1f3fd.svg", "<svg/>"),
            ("twemoji-14.0.2/assets/72x72/1f600.png", "png"),
            ("twemoji-14.0.2/README.md", "readme"),
        ]);

        let count = extract_bundle(bundle, &dest, ".svg").await.unwrap();
        assert_eq!(count, 2);

        let mut names: Vec<_> = std::fs::read_dir(&dest)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["1f44b-1f3fd.svg", "1f600.svg"]);
    }

    #[tokio::test]
    async fn test_extract_keeps_first_duplicate() {
        let temp = TempDir::new().unwrap();
        let bundle = zip_of(&[("a/1F600.svg", "first"), ("b/1F600.svg", "second")]);

        let count = extract_bundle(bundle, temp.path(), ".svg").await.unwrap();
        assert_eq!(count, 1);
        assert_eq!(std::fs::read_to_string(temp.path().join("1F600.svg")).unwrap(), "first");
    }

    #[tokio::test]
    async fn test_extract_rejects_non_zip() {
        let temp = TempDir::new().unwrap();
        let err = extract_bundle(b"not a zip".to_vec(), temp.path(), ".svg")
            .await
            .unwrap_err();
        assert_eq!(err.code(), "PARSE_ERROR");
    }

    #[tokio::test]
    async fn test_remove_asset_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("openmoji");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("1F600.svg"), "<svg/>").unwrap();

        remove_asset_dir(&dir).await.unwrap();
        assert!(!dir.exists());

        let err = remove_asset_dir(&dir).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
