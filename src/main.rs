use log::{error, info};
use mimalloc::MiMalloc;
use std::convert::Infallible;
use std::net::TcpListener;
use std::path::PathBuf;
use warp::Filter;

use mosaic_folio::catalog_store::CatalogStore;
use mosaic_folio::config::Config;
use mosaic_folio::file_scanner::FileScanner;
use mosaic_folio::warp_handlers::{self, GallerySettings};
use mosaic_folio::warp_helpers::{cors, handle_rejection, with_settings, with_store};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let port = config.port;

    info!("Starting Mosaic Folio server on Port {}", port);
    info!("Photo path: {}", config.photo_path);
    info!(
        "Collections: fallback '{}', hidden '{}', default '{}'",
        config.fallback_collection, config.hidden_collection, config.default_collection
    );
    match config.layout_seed {
        Some(seed) => info!("Layout seed pinned to {}", seed),
        None => info!("Layout seed drawn per page load"),
    }

    // Check if port is available BEFORE scanning photos
    if !is_port_available(&config.host, port) {
        error!(
            "Port {} is already in use. Please stop any existing Mosaic Folio instances or use a different port.",
            port
        );
        return Err(format!("Port {} is already in use", port).into());
    }

    let store = CatalogStore::load(
        FileScanner::new(PathBuf::from(&config.photo_path)),
        config.catalog_options(),
    );
    let settings = GallerySettings {
        rules: config.collection_rules(),
        fixed_seed: config.fixed_seed(),
    };

    let health_routes = build_health_routes();
    let gallery_routes = build_gallery_routes(store.clone(), settings);
    let asset_routes = build_asset_routes(store);
    let static_routes = build_static_routes();

    let routes = health_routes
        .or(gallery_routes)
        .or(asset_routes)
        .or(static_routes)
        .with(cors())
        .with(warp::log("mosaic_folio"))
        .recover(handle_rejection);

    let host: std::net::IpAddr = config.host.parse()?;
    info!(
        "Server started successfully, listening on http://localhost:{}",
        port
    );

    warp::serve(routes).run((host, port)).await;

    Ok(())
}

fn is_port_available(host: &str, port: u16) -> bool {
    TcpListener::bind((host, port)).is_ok()
}

fn build_health_routes() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
{
    warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(warp_handlers::health_check)
}

fn build_gallery_routes(
    store: CatalogStore,
    settings: GallerySettings,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api_collections = warp::path("api")
        .and(warp::path("collections"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and(with_settings(settings.clone()))
        .and_then(warp_handlers::list_collections);

    let api_gallery = warp::path("api")
        .and(warp::path("gallery"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<warp_handlers::GalleryQuery>())
        .and(with_store(store.clone()))
        .and(with_settings(settings))
        .and_then(warp_handlers::gallery_view);

    let api_lightbox = warp::path("api")
        .and(warp::path("lightbox"))
        .and(warp::path::param::<usize>())
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<warp_handlers::LightboxQuery>())
        .and(with_store(store.clone()))
        .and_then(warp_handlers::lightbox_view);

    let api_reload = warp::path("api")
        .and(warp::path("catalog"))
        .and(warp::path("reload"))
        .and(warp::path::end())
        .and(warp::post())
        .and(with_store(store))
        .and_then(warp_handlers::reload_catalog);

    api_collections
        .or(api_gallery)
        .or(api_lightbox)
        .or(api_reload)
}

fn build_asset_routes(
    store: CatalogStore,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("assets")
        .and(warp::path::tail())
        .and(warp::get())
        .and(with_store(store))
        .and_then(warp_handlers::get_asset)
}

fn build_static_routes() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
{
    let static_index = warp::path::end().and(warp::get()).and_then(|| async {
        Ok::<_, Infallible>(warp::reply::html(include_str!("../static/index.html")))
    });

    let static_css = warp::path("css")
        .and(warp::path("gallery.css"))
        .and(warp::path::end())
        .and(warp::get())
        .and_then(|| async {
            Ok::<_, Infallible>(warp::reply::with_header(
                include_str!("../static/css/gallery.css"),
                "content-type",
                "text/css",
            ))
        });

    let static_js = warp::path("js")
        .and(warp::path("gallery.js"))
        .and(warp::path::end())
        .and(warp::get())
        .and_then(|| async {
            Ok::<_, Infallible>(warp::reply::with_header(
                include_str!("../static/js/gallery.js"),
                "content-type",
                "application/javascript",
            ))
        });

    static_css.or(static_js).or(static_index)
}
