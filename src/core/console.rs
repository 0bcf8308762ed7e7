//! Dev console operations. Each returns a serializable summary for the envelope.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs as async_fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::base::{self, EnrichReport};
use crate::core::bundle::{extract_bundle, remove_asset_dir};
use crate::core::error::{EmojiError, EmojiResult};
use crate::core::fetch::RemoteSource;
use crate::core::naming::NamingPolicy;
use crate::core::resolve::{get_display, normalize, Display, DisplayOptions};
use crate::core::setmap::build_set_map;
use crate::core::store::{asset_status, list_asset_files, ArtifactStore, AssetStatus, MapStatus};

#[derive(Debug, Clone, Serialize)]
pub struct BaseBuildSummary {
    pub path: PathBuf,
    pub entries: usize,
    /// Sets whose directories were scanned (asset-based builds only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scanned_sets: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapBuildSummary {
    pub set: String,
    pub mapped: usize,
    pub missing: usize,
    pub unused: usize,
    pub manual: usize,
    pub map_path: PathBuf,
    pub report_path: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadSummary {
    pub set: String,
    pub url: String,
    pub dir: PathBuf,
    pub files: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoveSummary {
    pub set: String,
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveOutcome {
    pub token: String,
    pub code: Option<String>,
    pub display: Display,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSummary {
    pub key: String,
    pub name: String,
    pub naming: NamingPolicy,
    pub ext: String,
    pub url_prefix: String,
    pub asset_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundle_url: Option<String>,
    pub active: bool,
    pub fallback: bool,
}

/// Entry point for every console operation
pub struct Console {
    config: Config,
    store: ArtifactStore,
    remote: Arc<dyn RemoteSource>,
}

impl Console {
    pub fn new(config: Config, remote: Arc<dyn RemoteSource>) -> Self {
        let store = ArtifactStore::new(config.get_data_dir());
        Self {
            config,
            store,
            remote,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Fetch `url`, or read `local` instead when given
    async fn source_text(&self, local: Option<&Path>, url: &str) -> EmojiResult<String> {
        match local {
            Some(path) => {
                info!("Reading {}", path.display());
                async_fs::read_to_string(path)
                    .await
                    .map_err(|e| EmojiError::io(path, e))
            }
            None => self.remote.fetch_text(url).await,
        }
    }

    /// Replace the base table with the Unicode enumeration
    pub async fn build_base(&self, source: Option<&Path>) -> EmojiResult<BaseBuildSummary> {
        let text = self
            .source_text(source, &self.config.get_unicode_url())
            .await?;
        let table = base::build_from_unicode(&text)?;
        let path = self.store.save_base(&table).await?;

        Ok(BaseBuildSummary {
            path,
            entries: table.len(),
            scanned_sets: Vec::new(),
        })
    }

    /// Replace the base table with bare entries taken from asset filenames
    pub async fn build_base_from_assets(&self) -> EmojiResult<BaseBuildSummary> {
        let mut listings = BTreeMap::new();
        for key in self.config.emoji.sets.keys() {
            let dir = self.config.asset_dir(key)?;
            match list_asset_files(&dir).await {
                Ok(files) => {
                    listings.insert(key.clone(), files);
                }
                Err(EmojiError::MissingAssetDir(_)) => {
                    info!("No asset directory for {}, skipping", key);
                }
                Err(e) => return Err(e),
            }
        }

        let table = base::build_from_asset_files(&self.config.emoji, &listings)?;
        let path = self.store.save_base(&table).await?;

        Ok(BaseBuildSummary {
            path,
            entries: table.len(),
            scanned_sets: listings.into_keys().collect(),
        })
    }

    pub async fn merge_gemoji(&self, source: Option<&Path>) -> EmojiResult<EnrichReport> {
        let mut table = self.store.load_base().await?;
        let json = self
            .source_text(source, &self.config.get_gemoji_url())
            .await?;
        let report = base::merge_gemoji(&mut table, &json)?;
        self.store.save_base(&table).await?;
        Ok(report)
    }

    pub async fn merge_iamcal(&self, source: Option<&Path>) -> EmojiResult<EnrichReport> {
        let mut table = self.store.load_base().await?;
        let json = self
            .source_text(source, &self.config.get_iamcal_url())
            .await?;
        let report = base::merge_iamcal(&mut table, &json)?;
        self.store.save_base(&table).await?;
        Ok(report)
    }

    pub async fn apply_skin_tones(&self) -> EmojiResult<EnrichReport> {
        let mut table = self.store.load_base().await?;
        let report = base::apply_skin_tones(&mut table);
        self.store.save_base(&table).await?;
        Ok(report)
    }

    /// Rebuild a set's map and diagnostic report from its asset directory
    ///
    /// Every precondition is checked before anything is written.
    pub async fn build_map(&self, set_key: &str) -> EmojiResult<MapBuildSummary> {
        let set = self.config.emoji.set(set_key)?;
        let table = self.store.load_base().await?;
        let dir = self.config.asset_dir(set_key)?;
        let files = list_asset_files(&dir).await?;

        let build = build_set_map(set, &table, &files);
        let map_path = self.store.save_set_map(set_key, &build.map).await?;
        let report_path = self.store.save_report(set_key, &build.report).await?;

        Ok(MapBuildSummary {
            set: set_key.to_string(),
            mapped: build.map.len(),
            missing: build.report.missing_files.len(),
            unused: build.report.unused_files.len(),
            manual: build.report.manual_assignments.len(),
            map_path,
            report_path,
        })
    }

    pub async fn map_status(&self, set_key: &str) -> EmojiResult<MapStatus> {
        self.config.emoji.set(set_key)?;
        self.store.map_status(set_key).await
    }

    pub async fn asset_status(&self, set_key: &str) -> EmojiResult<AssetStatus> {
        let set = self.config.emoji.set(set_key)?;
        let dir = self.config.asset_dir(set_key)?;
        asset_status(&dir, &set.ext).await
    }

    /// Download and unpack the bundle of each set, in order
    ///
    /// Every key is validated before the first request.
    pub async fn download_assets(&self, set_keys: &[String]) -> EmojiResult<Vec<DownloadSummary>> {
        let mut plans = Vec::with_capacity(set_keys.len());
        for key in set_keys {
            let set = self.config.emoji.set(key)?;
            let url = set
                .bundle_url
                .clone()
                .ok_or_else(|| EmojiError::NoBundle(key.clone()))?;
            plans.push((key, url, set.ext.clone(), self.config.asset_dir(key)?));
        }

        let mut summaries = Vec::with_capacity(plans.len());
        for (key, url, ext, dir) in plans {
            let bytes = self.remote.fetch_bytes(&url).await?;
            let files = extract_bundle(bytes, &dir, &ext).await?;
            if files == 0 {
                warn!("Bundle for {} contained no {} files", key, ext);
            }
            summaries.push(DownloadSummary {
                set: key.clone(),
                url,
                dir,
                files,
            });
        }

        Ok(summaries)
    }

    pub async fn remove_assets(&self, set_key: &str) -> EmojiResult<RemoveSummary> {
        let dir = self.config.asset_dir(set_key)?;
        let dir = remove_asset_dir(&dir).await?;
        Ok(RemoveSummary {
            set: set_key.to_string(),
            dir,
        })
    }

    /// Render a token against the stored table and set maps
    pub async fn resolve(&self, token: &str, options: &DisplayOptions) -> EmojiResult<ResolveOutcome> {
        let system = &self.config.emoji;
        for key in [&options.preferred_set, &options.fallback_set].into_iter().flatten() {
            system.set(key)?;
        }

        let table = self.store.load_base().await?;
        let preferred = options.preferred_set.as_deref().unwrap_or(&system.active_set);
        let fallback = options.fallback_set.as_deref().unwrap_or(&system.fallback_set);
        let maps = self.store.load_set_maps([preferred, fallback]).await?;

        let display = get_display(token, options, &table, system, &maps);
        Ok(ResolveOutcome {
            token: token.to_string(),
            code: normalize(token, &table, system.shortcodes_enabled),
            html: display.to_html(),
            display,
        })
    }

    pub fn list_sets(&self) -> Vec<SetSummary> {
        let system = &self.config.emoji;
        system
            .sets
            .iter()
            .map(|(key, set)| SetSummary {
                key: key.clone(),
                name: set.name.clone(),
                naming: set.naming.clone(),
                ext: set.ext.clone(),
                url_prefix: set.url_prefix.clone(),
                asset_dir: self.config.resolve_path(&set.asset_dir),
                notes: set.notes.clone(),
                bundle_url: set.bundle_url.clone(),
                active: *key == system.active_set,
                fallback: *key == system.fallback_set,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_GEMOJI_URL, DEFAULT_IAMCAL_URL, DEFAULT_UNICODE_URL};
    use crate::core::bundle::testing::zip_of;
    use crate::core::fetch::testing::StaticSource;
    use tempfile::TempDir;

    const EMOJI_TEST: &str = "\
# group: Smileys & Emotion
# subgroup: face-smiling
1F600 ; fully-qualified # 😀 E1.0 grinning face
# group: People & Body
# subgroup: hand-fingers-open
1F44B ; fully-qualified # 👋 E0.6 waving hand
1F44B 1F3FD ; fully-qualified # 👋🏽 E1.0 waving hand: medium skin tone
";

    const GEMOJI: &str = r#"[{"emoji": "😀", "aliases": ["grinning"], "tags": ["smile"]}]"#;
    const IAMCAL: &str = r#"[{"unified": "1F44B", "short_names": ["wave"]}]"#;

    fn console(temp: &TempDir, remote: StaticSource) -> Console {
        let config = Config {
            root_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };
        Console::new(config, Arc::new(remote))
    }

    fn remote() -> StaticSource {
        StaticSource::default()
            .with(DEFAULT_UNICODE_URL, EMOJI_TEST)
            .with(DEFAULT_GEMOJI_URL, GEMOJI)
            .with(DEFAULT_IAMCAL_URL, IAMCAL)
    }

    fn write_assets(temp: &TempDir, set: &str, files: &[&str]) {
        let dir = temp.path().join("public/emoji").join(set);
        std::fs::create_dir_all(&dir).unwrap();
        for file in files {
            std::fs::write(dir.join(file), "<svg/>").unwrap();
        }
    }

    #[tokio::test]
    async fn test_full_pipeline_resolves_with_fallback() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, remote());

        let built = console.build_base(None).await.unwrap();
        assert_eq!(built.entries, 3);
        assert!(built.path.ends_with("public/dev/emoji/emoji-base.json"));

        let gemoji = console.merge_gemoji(None).await.unwrap();
        assert_eq!(gemoji.updated, 1);
        let iamcal = console.merge_iamcal(None).await.unwrap();
        assert_eq!(iamcal.updated, 1);
        let tones = console.apply_skin_tones().await.unwrap();
        assert_eq!((tones.updated, tones.total), (3, 3));

        write_assets(&temp, "openmoji", &["1F44B.svg"]);
        write_assets(&temp, "twemoji", &["1f600.svg", "1f44b.svg"]);
        let openmoji = console.build_map("openmoji").await.unwrap();
        assert_eq!((openmoji.mapped, openmoji.missing), (1, 2));
        console.build_map("twemoji").await.unwrap();

        let grin = console.resolve(":grinning:", &DisplayOptions::default()).await.unwrap();
        assert_eq!(grin.code.as_deref(), Some("1F600"));
        assert!(matches!(
            grin.display,
            Display::Image { ref src, ref set, .. } if src == "/emoji/twemoji/1f600.svg" && set == "twemoji"
        ));
        assert!(grin.html.starts_with("<img src=\"/emoji/twemoji/1f600.svg\""));

        let wave = console.resolve("wave", &DisplayOptions::default()).await.unwrap();
        assert!(matches!(
            wave.display,
            Display::Image { ref src, .. } if src == "/emoji/openmoji/1F44B.svg"
        ));

        let unknown = console.resolve("🙂", &DisplayOptions::default()).await.unwrap();
        assert_eq!(unknown.code, None);
        assert_eq!(unknown.html, "<span>🙂</span>");
    }

    #[tokio::test]
    async fn test_build_base_from_local_file() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("emoji-test.txt");
        std::fs::write(&source, EMOJI_TEST).unwrap();
        let remote = StaticSource::default();
        let console = console(&temp, remote);

        let built = console.build_base(Some(&source)).await.unwrap();
        assert_eq!(built.entries, 3);
    }

    #[tokio::test]
    async fn test_enrichment_requires_base_and_skips_fetch() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(remote());
        let config = Config {
            root_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };
        let console = Console::new(config, remote.clone());

        let err = console.merge_gemoji(None).await.unwrap_err();
        assert_eq!(err.code(), "MISSING_EMOJI_BASE");
        assert!(remote.requested.lock().unwrap().is_empty());

        let err = console.apply_skin_tones().await.unwrap_err();
        assert_eq!(err.code(), "MISSING_EMOJI_BASE");
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_base_untouched() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, StaticSource::default().with(DEFAULT_UNICODE_URL, EMOJI_TEST));
        console.build_base(None).await.unwrap();
        let before = std::fs::read_to_string(console.store().base_path()).unwrap();

        let err = console.merge_iamcal(None).await.unwrap_err();
        assert_eq!(err.code(), "TRANSPORT_ERROR");
        let after = std::fs::read_to_string(console.store().base_path()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_build_base_from_assets() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, StaticSource::default());

        let err = console.build_base_from_assets().await.unwrap_err();
        assert_eq!(err.code(), "NO_ASSETS_FOUND");

        write_assets(&temp, "openmoji", &["1F600.svg"]);
        write_assets(&temp, "blobmoji", &["emoji_u1f44b_1f3fd.svg", "emoji_u1f600.svg"]);
        write_assets(&temp, "sensamoji", &["Waving hand.svg"]);

        let built = console.build_base_from_assets().await.unwrap();
        assert_eq!(built.entries, 2);
        assert_eq!(built.scanned_sets, vec!["blobmoji", "openmoji", "sensamoji"]);

        let table = console.store().load_base().await.unwrap();
        assert!(table.contains_key("1F44B-1F3FD"));
    }

    #[tokio::test]
    async fn test_build_map_preconditions_write_nothing() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, remote());

        let err = console.build_map("nonesuch").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_SET_KEY");

        let err = console.build_map("openmoji").await.unwrap_err();
        assert_eq!(err.code(), "MISSING_EMOJI_BASE");

        console.build_base(None).await.unwrap();
        let err = console.build_map("openmoji").await.unwrap_err();
        assert_eq!(err.code(), "MISSING_ASSET_DIR");

        assert!(!console.store().set_map_path("openmoji").exists());
        assert!(!console.store().report_path("openmoji").exists());
    }

    #[tokio::test]
    async fn test_build_map_empty_directory() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, remote());
        console.build_base(None).await.unwrap();
        write_assets(&temp, "notomoji", &[]);

        let summary = console.build_map("notomoji").await.unwrap();
        assert_eq!(summary.mapped, 0);
        assert_eq!(summary.missing, 3);
        assert_eq!(console.store().load_set_map("notomoji").await.unwrap(), Some(Default::default()));

        let status = console.map_status("notomoji").await.unwrap();
        assert!(status.exists);
        assert_eq!(status.size, Some(0));
    }

    #[tokio::test]
    async fn test_map_and_asset_status_validate_keys() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, StaticSource::default());

        assert_eq!(console.map_status("bogus").await.unwrap_err().code(), "INVALID_SET_KEY");
        assert_eq!(console.asset_status("bogus").await.unwrap_err().code(), "INVALID_SET_KEY");

        let status = console.asset_status("twemoji").await.unwrap();
        assert!(!status.exists);
    }

    #[tokio::test]
    async fn test_download_and_remove_assets() {
        let temp = TempDir::new().unwrap();
        let console_cfg = Config {
            root_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };
        let url = console_cfg.emoji.sets["twemoji"].bundle_url.clone().unwrap();
        let bundle = zip_of(&[
            ("twemoji-14.0.2/assets/svg/1f600.svg", "<svg/>"),
            ("twemoji-14.0.2/assets/72x72/1f600.png", "png"),
        ]);
        let console = Console::new(console_cfg, Arc::new(StaticSource::default().with(&url, bundle)));

        let summaries = console.download_assets(&["twemoji".to_string()]).await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].files, 1);

        let status = console.asset_status("twemoji").await.unwrap();
        assert_eq!(status.files, vec!["1f600.svg"]);

        console.remove_assets("twemoji").await.unwrap();
        let err = console.remove_assets("twemoji").await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_download_validates_every_key_first() {
        let temp = TempDir::new().unwrap();
        let remote = Arc::new(StaticSource::default());
        let config = Config {
            root_dir: Some(temp.path().to_path_buf()),
            ..Config::default()
        };
        let console = Console::new(config, remote.clone());

        let err = console
            .download_assets(&["openmoji".to_string(), "blobmoji".to_string()])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NO_BUNDLE");
        assert!(remote.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_rejects_unknown_set_option() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, remote());
        console.build_base(None).await.unwrap();

        let options = DisplayOptions {
            preferred_set: Some("nope".to_string()),
            ..DisplayOptions::default()
        };
        let err = console.resolve("1F600", &options).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_SET_KEY");
    }

    #[test]
    fn test_list_sets_marks_active_and_fallback() {
        let temp = TempDir::new().unwrap();
        let console = console(&temp, StaticSource::default());
        let sets = console.list_sets();

        assert_eq!(sets.len(), 5);
        let openmoji = sets.iter().find(|s| s.key == "openmoji").unwrap();
        assert!(openmoji.active && !openmoji.fallback);
        let twemoji = sets.iter().find(|s| s.key == "twemoji").unwrap();
        assert!(twemoji.fallback);
        let sensa = sets.iter().find(|s| s.key == "sensamoji").unwrap();
        assert!(sensa.naming.is_name_based());
        assert!(sensa.asset_dir.starts_with(temp.path()));
    }
}
