use crate::mimetype_detector;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Url prefix under which discovered images are served.
pub const ASSET_URL_PREFIX: &str = "/assets";

/// Discovers gallery images below a single photo root.
#[derive(Debug, Clone)]
pub struct FileScanner {
    photo_root: PathBuf,
}

impl FileScanner {
    pub fn new(photo_root: PathBuf) -> Self {
        Self { photo_root }
    }

    /// Maps each image's `/`-separated path relative to the root onto the
    /// url it is served from.
    pub fn scan(&self) -> BTreeMap<String, String> {
        let mut assets = BTreeMap::new();

        if !self.photo_root.exists() {
            warn!(
                "Photo directory does not exist: {}",
                self.photo_root.display()
            );
            return assets;
        }

        info!("Scanning directory: {}", self.photo_root.display());
        self.walk_directory(&self.photo_root, &mut assets);
        info!("Found {} images", assets.len());

        assets
    }

    /// Recursively walk a directory and collect image files
    fn walk_directory(&self, dir: &Path, assets: &mut BTreeMap<String, String>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read directory {}: {}", dir.display(), e);
                return;
            }
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();

            if path.is_dir() {
                self.walk_directory(&path, assets);
            } else if path.is_file() && mimetype_detector::is_gallery_image(&path) {
                if let Some(relative) = self.relative_key(&path) {
                    let url = format!("{}/{}", ASSET_URL_PREFIX, relative);
                    assets.insert(relative, url);
                }
            }
        }
    }

    fn relative_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.photo_root).ok()?;
        let segments: Option<Vec<&str>> = relative
            .components()
            .map(|component| match component {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect();

        match segments {
            Some(segments) => Some(segments.join("/")),
            None => {
                warn!("Skipping non UTF-8 path: {}", path.display());
                None
            }
        }
    }

    /// Resolves a relative asset path to a file below the root.
    ///
    /// Returns `None` for anything that could escape the root.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let mut resolved = self.photo_root.clone();

        for segment in relative.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return None;
            }
            resolved.push(segment);
        }

        Some(resolved)
    }
}
