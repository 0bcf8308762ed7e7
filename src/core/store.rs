use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs as async_fs;
use tracing::debug;

use crate::core::error::{EmojiError, EmojiResult};
use crate::core::resolve::SetMaps;
use crate::core::setmap::{DiagnosticReport, EmojiSetMap};
use crate::core::table::EmojiTable;

pub const BASE_FILE: &str = "emoji-base.json";

/// On-disk state of a set map artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStatus {
    pub exists: bool,
    /// Number of entries in the map
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Contents of a set's asset directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStatus {
    pub exists: bool,
    pub file_count: usize,
    pub files: Vec<String>,
}

/// Reads and writes the JSON artifacts under the data directory
pub struct ArtifactStore {
    data_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn base_path(&self) -> PathBuf {
        self.data_dir.join(BASE_FILE)
    }

    pub fn set_map_path(&self, set_key: &str) -> PathBuf {
        self.data_dir.join(format!("emoji-{set_key}.json"))
    }

    pub fn report_path(&self, set_key: &str) -> PathBuf {
        self.data_dir.join(format!("{set_key}-debug-report.json"))
    }

    pub async fn load_base(&self) -> EmojiResult<EmojiTable> {
        let path = self.base_path();
        match read_json(&path).await? {
            Some(table) => Ok(table),
            None => Err(EmojiError::MissingBase(path)),
        }
    }

    pub async fn save_base(&self, table: &EmojiTable) -> EmojiResult<PathBuf> {
        let path = self.base_path();
        write_json_atomic(&path, table).await?;
        debug!("Wrote {} entries to {}", table.len(), path.display());
        Ok(path)
    }

    pub async fn save_set_map(&self, set_key: &str, map: &EmojiSetMap) -> EmojiResult<PathBuf> {
        let path = self.set_map_path(set_key);
        write_json_atomic(&path, map).await?;
        Ok(path)
    }

    pub async fn save_report(&self, set_key: &str, report: &DiagnosticReport) -> EmojiResult<PathBuf> {
        let path = self.report_path(set_key);
        write_json_atomic(&path, report).await?;
        Ok(path)
    }

    /// Load a set map; a map that was never built reads as `None`
    pub async fn load_set_map(&self, set_key: &str) -> EmojiResult<Option<EmojiSetMap>> {
        read_json(&self.set_map_path(set_key)).await
    }

    /// Load every map that exists among `set_keys`
    pub async fn load_set_maps<'a, I>(&self, set_keys: I) -> EmojiResult<SetMaps>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut maps = SetMaps::new();
        for key in set_keys {
            if maps.contains_key(key) {
                continue;
            }
            if let Some(map) = self.load_set_map(key).await? {
                maps.insert(key.to_string(), map);
            }
        }
        Ok(maps)
    }

    pub async fn map_status(&self, set_key: &str) -> EmojiResult<MapStatus> {
        let path = self.set_map_path(set_key);
        let metadata = match async_fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(MapStatus {
                    exists: false,
                    size: None,
                    date: None,
                })
            }
            Err(e) => return Err(EmojiError::io(&path, e)),
        };

        let date = metadata
            .modified()
            .ok()
            .map(|modified| DateTime::<Local>::from(modified).format("%Y-%m-%d").to_string());
        let size = self.load_set_map(set_key).await?.map(|map| map.len());

        Ok(MapStatus {
            exists: size.is_some(),
            size,
            date,
        })
    }
}

/// Sorted regular-file names directly inside `dir`
pub async fn list_asset_files(dir: &Path) -> EmojiResult<Vec<String>> {
    let mut entries = async_fs::read_dir(dir)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => EmojiError::MissingAssetDir(dir.to_path_buf()),
            _ => EmojiError::io(dir, e),
        })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| EmojiError::io(dir, e))? {
        let file_type = entry.file_type().await.map_err(|e| EmojiError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            files.push(name.to_string());
        }
    }
    files.sort();
    Ok(files)
}

/// Asset files in `dir` ending in `ext`; a missing directory is reported, not an error
pub async fn asset_status(dir: &Path, ext: &str) -> EmojiResult<AssetStatus> {
    match list_asset_files(dir).await {
        Ok(files) => {
            let files: Vec<String> = files.into_iter().filter(|f| f.ends_with(ext)).collect();
            Ok(AssetStatus {
                exists: true,
                file_count: files.len(),
                files,
            })
        }
        Err(EmojiError::MissingAssetDir(_)) => Ok(AssetStatus {
            exists: false,
            file_count: 0,
            files: Vec::new(),
        }),
        Err(e) => Err(e),
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> EmojiResult<Option<T>> {
    let json = match async_fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(EmojiError::io(path, e)),
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| EmojiError::parse(path.display().to_string(), e))
}

/// Pretty-print `value` next to `path` and rename it into place
pub(crate) async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> EmojiResult<()> {
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| EmojiError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(value)
        .map_err(|e| EmojiError::parse(path.display().to_string(), e))?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    async_fs::write(&tmp_path, json)
        .await
        .map_err(|e| EmojiError::io(&tmp_path, e))?;
    async_fs::rename(&tmp_path, path)
        .await
        .map_err(|e| EmojiError::io(path, e))?;

    Ok(())
}
