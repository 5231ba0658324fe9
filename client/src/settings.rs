use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use kitbag_core::{
    constants::{INVENTORY_SIZE, STORAGE_PLACEHOLDER_SIZE},
    equip_slot::OffsetTable,
    shortcuts::ItemShortcuts,
};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::protocol::Dialect;

const SETTINGS_DIR: &str = ".kitbag";
const SETTINGS_FILE_NAME: &str = "sync.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub dialect: Dialect,

    /// Wire offsets for the classic dialect; `None` keeps the defaults.
    pub classic_offsets: Option<OffsetTable>,
    /// Wire offsets for the athena dialect; `None` keeps the defaults.
    pub athena_offsets: Option<OffsetTable>,

    pub inventory_capacity: usize,
    /// Storage capacity assumed until the server announces the real one.
    pub storage_placeholder_capacity: usize,

    pub log_level: String,
    pub log_file: Option<String>,

    pub shortcuts: ItemShortcuts,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            classic_offsets: None,
            athena_offsets: None,
            inventory_capacity: INVENTORY_SIZE,
            storage_placeholder_capacity: STORAGE_PLACEHOLDER_SIZE,
            log_level: "info".to_string(),
            log_file: None,
            shortcuts: ItemShortcuts::default(),
        }
    }
}

impl SyncSettings {
    /// Offset override configured for `dialect`, if any.
    pub fn offsets_for(&self, dialect: Dialect) -> Option<OffsetTable> {
        match dialect {
            Dialect::Classic => self.classic_offsets,
            Dialect::Athena => self.athena_offsets,
        }
    }

    pub fn level_filter(&self) -> LevelFilter {
        kitbag_core::parse_level(&self.log_level)
    }

    /// Reads settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> SyncSettings {
        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("Using default sync settings, cannot read {:?}: {e}", path);
                return SyncSettings::default();
            }
        };

        match serde_json::from_slice::<SyncSettings>(&bytes) {
            Ok(s) => s,
            Err(e) => {
                log::error!("Failed to parse settings file {:?}: {e}", path);
                SyncSettings::default()
            }
        }
    }

    /// Writes the settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating settings dir {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing settings")?;
        fs::write(path, format!("{json}\n"))
            .with_context(|| format!("writing settings file {:?}", path))?;
        Ok(())
    }
}

/// `$HOME/.kitbag/sync.json`, `%APPDATA%\.kitbag\sync.json`, or
/// `./sync.json` when neither is set.
pub fn default_settings_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(SETTINGS_DIR).join(SETTINGS_FILE_NAME);
    } else if let Ok(appdata) = std::env::var("APPDATA") {
        return PathBuf::from(appdata)
            .join(SETTINGS_DIR)
            .join(SETTINGS_FILE_NAME);
    }

    log::info!("Using fallback settings path: ./{SETTINGS_FILE_NAME}");
    PathBuf::from(SETTINGS_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("kitbag-settings-{}-{name}", std::process::id()))
            .join("sync.json")
    }

    #[test]
    fn empty_object_yields_defaults() {
        let settings: SyncSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SyncSettings::default());
        assert_eq!(settings.inventory_capacity, 100);
        assert_eq!(settings.storage_placeholder_capacity, 300);
        assert_eq!(settings.level_filter(), LevelFilter::Info);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let settings: SyncSettings = serde_json::from_str(
            r#"{ "dialect": "classic", "classic_offsets": { "inventory": 24, "storage": 1 } }"#,
        )
        .unwrap();
        assert_eq!(settings.dialect, Dialect::Classic);
        assert_eq!(
            settings.offsets_for(Dialect::Classic),
            Some(OffsetTable {
                inventory: 24,
                storage: 1,
            })
        );
        assert_eq!(settings.offsets_for(Dialect::Athena), None);
        assert_eq!(settings.inventory_capacity, INVENTORY_SIZE);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = scratch_path("missing");
        assert_eq!(SyncSettings::load(&path), SyncSettings::default());
    }

    #[test]
    fn save_then_load() {
        let path = scratch_path("roundtrip");
        let mut settings = SyncSettings {
            dialect: Dialect::Classic,
            log_level: "debug".to_string(),
            ..SyncSettings::default()
        };
        settings.shortcuts.set(2, 501);

        settings.save(&path).unwrap();
        let loaded = SyncSettings::load(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.shortcuts.get(2), Some(501));

        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn garbage_file_yields_defaults() {
        let path = scratch_path("garbage");
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).unwrap();
        }
        fs::write(&path, b"not json").unwrap();
        assert_eq!(SyncSettings::load(&path), SyncSettings::default());
        if let Some(dir) = path.parent() {
            let _ = fs::remove_dir_all(dir);
        }
    }
}
