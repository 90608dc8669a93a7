use crate::catalog::CatalogOptions;
use crate::collections::CollectionRules;
use crate::mosaic_layout::LayoutSeed;
use std::env;

#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    pub max_dimension: u32,
    pub jpeg_quality: u8,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub photo_path: String,
    pub logo_file: String,
    pub fallback_collection: String,
    pub hidden_collection: String,
    pub default_collection: String,
    /// Fixed layout seed; a fresh one is drawn per page load when unset.
    pub layout_seed: Option<u32>,
    pub optimize: OptimizeConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any `MOSAIC_FOLIO_*` key source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| {
            lookup(&format!("MOSAIC_FOLIO_{}", name)).unwrap_or_else(|| default.to_string())
        };

        let layout_seed: Option<u32> = match lookup("MOSAIC_FOLIO_LAYOUT_SEED") {
            Some(value) if !value.trim().is_empty() => Some(value.trim().parse()?),
            _ => None,
        };

        Ok(Config {
            port: var("PORT", "18474").parse()?,
            host: var("HOST", "0.0.0.0"),
            photo_path: var("PHOTO_PATH", "./photos"),
            logo_file: var("LOGO_FILE", "logo.png"),
            fallback_collection: var("FALLBACK_COLLECTION", "Portfolio"),
            hidden_collection: var("HIDDEN_COLLECTION", "website"),
            default_collection: var("DEFAULT_COLLECTION", "dance1"),
            layout_seed,
            optimize: OptimizeConfig {
                max_dimension: var("OPTIMIZE_MAX_DIMENSION", "1200").parse()?,
                jpeg_quality: var("OPTIMIZE_JPEG_QUALITY", "85").parse()?,
                workers: var("OPTIMIZE_WORKERS", &num_cpus::get().to_string()).parse()?,
            },
        })
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            logo_file: self.logo_file.clone(),
            fallback_collection: self.fallback_collection.clone(),
        }
    }

    pub fn collection_rules(&self) -> CollectionRules {
        CollectionRules {
            hidden_label: self.hidden_collection.clone(),
            default_collection: self.default_collection.clone(),
        }
    }

    pub fn fixed_seed(&self) -> Option<LayoutSeed> {
        self.layout_seed.map(LayoutSeed::new)
    }
}
