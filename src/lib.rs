pub mod catalog;
pub mod catalog_store;
pub mod collections;
pub mod config;
pub mod file_scanner;
pub mod gallery_session;
pub mod lightbox;
pub mod mimetype_detector;
pub mod mosaic_layout;
pub mod photo_optimizer;
pub mod warp_handlers;
pub mod warp_helpers;
