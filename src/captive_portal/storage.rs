//! Static assets served by the portal

use std::{
    fs::File,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    root: Option<PathBuf>,
}

impl AssetStore {
    pub fn at<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    /// Store used when the filesystem could not be mounted; every lookup misses.
    pub fn unavailable() -> Self {
        Self { root: None }
    }

    pub fn is_mounted(&self) -> bool {
        self.root.is_some()
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, std::path::Component::Normal(_)));
        if relative.as_os_str().is_empty() || escapes {
            return None;
        }
        Some(self.root.as_ref()?.join(relative))
    }

    pub fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }

    pub fn open(&self, path: &str) -> Option<File> {
        let full = self.resolve(path)?;
        match File::open(&full) {
            Ok(file) => Some(file),
            Err(e) => {
                log::debug!("Asset {:?} unavailable: {:?}", full, e);
                None
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn mount_spiffs(max_files: usize) -> anyhow::Result<AssetStore> {
    use esp_idf_svc::sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

    const BASE_PATH: &std::ffi::CStr = c"/spiffs";

    let conf = esp_vfs_spiffs_conf_t {
        base_path: BASE_PATH.as_ptr(),
        partition_label: std::ptr::null(),
        max_files: max_files as _,
        format_if_mount_failed: true,
    };
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })?;

    Ok(AssetStore::at(BASE_PATH.to_str()?))
}
