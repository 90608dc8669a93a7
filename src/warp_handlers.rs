use crate::catalog::Catalog;
use crate::catalog_store::CatalogStore;
use crate::collections::{CollectionFilter, CollectionRules};
use crate::file_scanner::ASSET_URL_PREFIX;
use crate::gallery_session::{GallerySession, GalleryView};
use crate::lightbox::{Lightbox, LightboxView};
use crate::mimetype_detector;
use crate::mosaic_layout::LayoutSeed;
use crate::warp_helpers::{CatalogLoadError, NotFoundError, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::json;

use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;
use warp::{reject, Rejection, Reply};

/// Per-server gallery behaviour shared by all handlers.
#[derive(Debug, Clone)]
pub struct GallerySettings {
    pub rules: CollectionRules,
    pub fixed_seed: Option<LayoutSeed>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    pub seed: Option<u32>,
    pub collection: Option<String>,
    pub columns: Option<usize>,
    pub width: Option<u32>,
    pub open: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LightboxQuery {
    pub action: Option<String>,
    /// Image the client is showing; takes precedence over the path index.
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<String>,
    pub show_filters: bool,
    /// Selection a fresh page load starts with.
    pub default: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxAction {
    Prev,
    Next,
}

impl FromStr for LightboxAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(LightboxAction::Prev),
            "next" => Ok(LightboxAction::Next),
            _ => Err(()),
        }
    }
}

pub async fn health_check() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn list_collections(
    store: CatalogStore,
    settings: GallerySettings,
) -> Result<impl Reply, Infallible> {
    let catalog = store.snapshot().await;
    let filter = CollectionFilter::new(&catalog, &settings.rules);

    Ok(warp::reply::json(&CollectionsResponse {
        collections: filter.collections().to_vec(),
        show_filters: filter.show_filters(),
        default: filter.active().to_string(),
    }))
}

/// Replays the request parameters onto a fresh session.
///
/// A missing seed is treated as a new page load and drawn at random unless
/// the server pins one.
pub fn build_session(
    catalog: Arc<Catalog>,
    query: &GalleryQuery,
    settings: &GallerySettings,
) -> Result<GallerySession, ValidationError> {
    let seed = query
        .seed
        .map(LayoutSeed::new)
        .or(settings.fixed_seed)
        .unwrap_or_else(LayoutSeed::random);

    let mut session = GallerySession::new(catalog, settings.rules.clone(), seed);

    if let Some(collection) = &query.collection {
        session.select_collection(collection);
    }

    match (query.columns, query.width) {
        (Some(columns), _) => session.set_columns(columns),
        (None, Some(width)) => session.set_viewport_width(width),
        (None, None) => {}
    }

    if let Some(index) = query.open {
        if !session.open_catalog_index(index) {
            return Err(ValidationError {
                message: format!("Lightbox index {} is out of range", index),
            });
        }
    }

    Ok(session)
}

pub async fn gallery_view(
    query: GalleryQuery,
    store: CatalogStore,
    settings: GallerySettings,
) -> Result<impl Reply, Rejection> {
    let catalog = store.snapshot().await;
    let session = build_session(catalog, &query, &settings).map_err(reject::custom)?;
    let view: GalleryView = session.view();

    log::debug!(
        "Gallery view: seed={} columns={} collection='{}' tiles={}",
        view.seed,
        view.columns,
        view.active_collection,
        view.tiles.len()
    );

    Ok(warp::reply::json(&view))
}

/// Opens the lightbox and applies the optional action.
///
/// A known `url` wins over `index`. Otherwise the index is clamped, since it
/// may predate a catalog reload. `None` only when the catalog is empty.
pub fn navigate(
    catalog: &Catalog,
    index: usize,
    url: Option<&str>,
    action: Option<LightboxAction>,
) -> Option<LightboxView> {
    let mut lightbox = match url.and_then(|url| catalog.position_of(url)) {
        Some(position) => Lightbox::Open(position),
        None => Lightbox::Open(index),
    };
    lightbox.clamp_to(catalog.len());

    match action {
        Some(LightboxAction::Prev) => lightbox.prev(catalog.len()),
        Some(LightboxAction::Next) => lightbox.next(catalog.len()),
        None => {}
    }

    LightboxView::for_state(catalog, lightbox)
}

pub async fn lightbox_view(
    index: usize,
    query: LightboxQuery,
    store: CatalogStore,
) -> Result<impl Reply, Rejection> {
    let action = match query.action.as_deref() {
        Some(raw) => Some(raw.parse::<LightboxAction>().map_err(|_| {
            reject::custom(ValidationError {
                message: format!("Unknown lightbox action: {}", raw),
            })
        })?),
        None => None,
    };

    let catalog = store.snapshot().await;
    match navigate(&catalog, index, query.url.as_deref(), action) {
        Some(view) => Ok(warp::reply::json(&view)),
        None => Err(reject::custom(NotFoundError)),
    }
}

pub async fn reload_catalog(store: CatalogStore) -> Result<impl Reply, Rejection> {
    match store.reload().await {
        Ok(catalog) => Ok(warp::reply::json(&json!({
            "images": catalog.len(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))),
        Err(e) => {
            log::error!("Catalog reload failed: {}", e);
            Err(reject::custom(CatalogLoadError {
                message: format!("Catalog reload failed: {}", e),
            }))
        }
    }
}

pub async fn get_asset(
    tail: warp::path::Tail,
    store: CatalogStore,
) -> Result<Box<dyn Reply>, Rejection> {
    let (file_data, content_type) = read_asset(&store, tail.as_str())
        .await
        .map_err(reject::custom)?;

    let reply = warp::reply::with_header(file_data, "content-type", content_type);
    let reply = warp::reply::with_header(reply, "cache-control", "public, max-age=31536000");

    Ok(Box::new(reply))
}

/// Loads a catalogued image and its content type from the raw url tail.
pub async fn read_asset(
    store: &CatalogStore,
    raw_tail: &str,
) -> Result<(Vec<u8>, String), NotFoundError> {
    let relative = percent_decode(raw_tail).ok_or(NotFoundError)?;
    let url = format!("{}/{}", ASSET_URL_PREFIX, relative);

    // Only catalogued images are served
    if store.snapshot().await.position_of(&url).is_none() {
        return Err(NotFoundError);
    }

    let path = store.scanner().resolve(&relative).ok_or(NotFoundError)?;

    match tokio::fs::read(&path).await {
        Ok(file_data) => {
            let content_type = mimetype_detector::from_path(&path)
                .map(|mime| mime.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            Ok((file_data, content_type))
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            Err(NotFoundError)
        }
    }
}

/// Decodes `%XX` escapes in a url path; `None` for malformed input.
fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(decoded).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{build_catalog, CatalogOptions};
    use crate::file_scanner::FileScanner;
    use crate::mosaic_layout::TileSize;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn catalog_of(paths: &[&str]) -> Catalog {
        let assets: BTreeMap<String, String> = paths
            .iter()
            .map(|path| (path.to_string(), format!("/assets/{}", path)))
            .collect();
        build_catalog(&assets, &CatalogOptions::default())
    }

    fn settings() -> GallerySettings {
        GallerySettings {
            rules: CollectionRules::default(),
            fixed_seed: None,
        }
    }

    fn store_with_files(paths: &[&str]) -> (CatalogStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        for path in paths {
            let full = temp_dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, b"image-bytes").unwrap();
        }
        let store = CatalogStore::load(
            FileScanner::new(temp_dir.path().to_path_buf()),
            CatalogOptions::default(),
        );
        (store, temp_dir)
    }

    #[test]
    fn test_build_session_from_query() {
        let catalog = Arc::new(catalog_of(&["cars/1.jpg", "dance1/2.jpg", "cars/3.jpg"]));
        let query = GalleryQuery {
            seed: Some(42),
            collection: Some("cars".to_string()),
            width: Some(1300),
            ..Default::default()
        };

        let session = build_session(catalog, &query, &settings()).unwrap();
        let view = session.view();
        assert_eq!(view.seed, LayoutSeed::new(42));
        assert_eq!(view.columns, 4);
        assert_eq!(view.active_collection, "cars");
        assert_eq!(view.image_count, 2);
        // rolls 42 and 49 at four columns
        assert_eq!(view.tiles[0].size, TileSize::Tall);
        assert_eq!(view.tiles[1].size, TileSize::Standard);
    }

    #[test]
    fn test_build_session_columns_override_width() {
        let catalog = Arc::new(catalog_of(&["a/1.jpg"]));
        let query = GalleryQuery {
            columns: Some(3),
            width: Some(320),
            ..Default::default()
        };
        let session = build_session(catalog, &query, &settings()).unwrap();
        assert_eq!(session.columns(), 3);
    }

    #[test]
    fn test_build_session_uses_pinned_seed() {
        let catalog = Arc::new(catalog_of(&["a/1.jpg"]));
        let pinned = GallerySettings {
            fixed_seed: Some(LayoutSeed::new(7)),
            ..settings()
        };
        let session = build_session(catalog, &GalleryQuery::default(), &pinned).unwrap();
        assert_eq!(session.seed(), LayoutSeed::new(7));
    }

    #[test]
    fn test_build_session_rejects_bad_open_index() {
        let catalog = Arc::new(catalog_of(&["a/1.jpg"]));
        let query = GalleryQuery {
            open: Some(1),
            ..Default::default()
        };
        assert!(build_session(catalog, &query, &settings()).is_err());
    }

    #[test]
    fn test_navigate_wraps() {
        let catalog = catalog_of(&["a/1.jpg", "a/2.jpg", "a/3.jpg", "a/4.jpg", "a/5.jpg"]);

        let view = navigate(&catalog, 0, None, Some(LightboxAction::Prev)).unwrap();
        assert_eq!(view.index, 4);
        assert_eq!(view.position_label, "5/5");

        let view = navigate(&catalog, 4, None, Some(LightboxAction::Next)).unwrap();
        assert_eq!(view.index, 0);

        let view = navigate(&catalog, 2, None, None).unwrap();
        assert_eq!(view.position_label, "3/5");
    }

    #[test]
    fn test_navigate_clamps_stale_index() {
        let catalog = catalog_of(&["a/1.jpg", "a/2.jpg"]);

        let view = navigate(&catalog, 5, None, None).unwrap();
        assert_eq!(view.index, 1);

        let view = navigate(&catalog, 5, None, Some(LightboxAction::Next)).unwrap();
        assert_eq!(view.index, 0);

        assert!(navigate(&catalog_of(&[]), 0, None, None).is_none());
    }

    #[test]
    fn test_navigate_prefers_known_url() {
        let catalog = catalog_of(&["a/1.jpg", "a/2.jpg", "a/3.jpg"]);

        let view = navigate(&catalog, 0, Some("/assets/a/3.jpg"), None).unwrap();
        assert_eq!(view.index, 2);

        let view = navigate(&catalog, 0, Some("/assets/a/2.jpg"), Some(LightboxAction::Prev));
        assert_eq!(view.unwrap().url, "/assets/a/1.jpg");

        // Unknown urls fall back to the index
        let view = navigate(&catalog, 1, Some("/assets/gone.jpg"), None).unwrap();
        assert_eq!(view.index, 1);
    }

    #[test]
    fn test_lightbox_action_parse() {
        assert_eq!("prev".parse::<LightboxAction>(), Ok(LightboxAction::Prev));
        assert_eq!("next".parse::<LightboxAction>(), Ok(LightboxAction::Next));
        assert_eq!("skip".parse::<LightboxAction>(), Err(()));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a/b.jpg").as_deref(), Some("a/b.jpg"));
        assert_eq!(
            percent_decode("dance%201/shot%2010.jpg").as_deref(),
            Some("dance 1/shot 10.jpg")
        );
        assert_eq!(percent_decode("bad%2"), None);
        assert_eq!(percent_decode("bad%zz"), None);
    }

    #[tokio::test]
    async fn test_read_asset_serves_only_catalogued_images() {
        let (store, temp_dir) = store_with_files(&["dance 1/shot 1.jpg", "cars/logo.png"]);
        fs::write(temp_dir.path().join("secret.txt"), b"nope").unwrap();

        let (data, content_type) = read_asset(&store, "dance%201/shot%201.jpg").await.unwrap();
        assert_eq!(data, b"image-bytes");
        assert_eq!(content_type, "image/jpeg");

        assert!(read_asset(&store, "cars/logo.png").await.is_err());
        assert!(read_asset(&store, "secret.txt").await.is_err());
        assert!(read_asset(&store, "../secret.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_lightbox_view_handler() {
        let (store, _temp_dir) = store_with_files(&["a/1.jpg", "a/2.jpg"]);

        let reply = lightbox_view(
            1,
            LightboxQuery {
                action: Some("next".to_string()),
                url: None,
            },
            store.clone(),
        )
        .await
        .unwrap();
        assert_eq!(reply.into_response().status().as_u16(), 200);

        let invalid = lightbox_view(
            0,
            LightboxQuery {
                action: Some("sideways".to_string()),
                url: None,
            },
            store,
        )
        .await;
        let rejection = invalid.err().unwrap();
        assert!(rejection.find::<ValidationError>().is_some());
    }

    #[tokio::test]
    async fn test_lightbox_after_catalog_shrinks() {
        let (store, temp_dir) = store_with_files(&["a/1.jpg", "a/2.jpg", "a/3.jpg"]);
        fs::remove_file(temp_dir.path().join("a/2.jpg")).unwrap();
        fs::remove_file(temp_dir.path().join("a/3.jpg")).unwrap();
        assert_eq!(store.reload().await.unwrap().len(), 1);

        let query = LightboxQuery {
            action: Some("next".to_string()),
            url: Some("/assets/a/3.jpg".to_string()),
        };
        let reply = lightbox_view(2, query, store.clone()).await.unwrap();
        assert_eq!(reply.into_response().status().as_u16(), 200);

        let catalog = store.snapshot().await;
        let view = navigate(&catalog, 2, Some("/assets/a/3.jpg"), Some(LightboxAction::Next));
        assert_eq!(view.unwrap().url, "/assets/a/1.jpg");
    }

    #[tokio::test]
    async fn test_lightbox_on_empty_catalog_is_not_found() {
        let (store, _temp_dir) = store_with_files(&[]);
        let missing = lightbox_view(0, LightboxQuery::default(), store).await;
        assert!(missing.err().unwrap().find::<NotFoundError>().is_some());
    }

    #[tokio::test]
    async fn test_gallery_view_handler() {
        let (store, _temp_dir) = store_with_files(&["dance1/1.jpg", "cars/2.jpg"]);

        let reply = gallery_view(GalleryQuery::default(), store.clone(), settings())
            .await
            .unwrap();
        assert_eq!(reply.into_response().status().as_u16(), 200);

        let bad = gallery_view(
            GalleryQuery {
                open: Some(10),
                ..Default::default()
            },
            store,
            settings(),
        )
        .await;
        assert!(bad.is_err());
    }

    #[tokio::test]
    async fn test_reload_and_collections_handlers() {
        let (store, _temp_dir) = store_with_files(&["dance1/1.jpg"]);

        let reply = reload_catalog(store.clone()).await.unwrap();
        assert_eq!(reply.into_response().status().as_u16(), 200);

        let reply = list_collections(store, settings()).await.unwrap();
        assert_eq!(reply.into_response().status().as_u16(), 200);
    }

    #[test]
    fn test_collections_response_fields() {
        let catalog = catalog_of(&["cars/1.jpg", "dance1/2.jpg"]);
        let filter = CollectionFilter::new(&catalog, &CollectionRules::default());
        let response = CollectionsResponse {
            collections: filter.collections().to_vec(),
            show_filters: filter.show_filters(),
            default: filter.active().to_string(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["default"], "dance1");
        assert_eq!(value["show_filters"], true);
        assert_eq!(value["collections"], json!(["cars", "dance1"]));
    }
}
