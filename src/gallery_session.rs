use crate::catalog::{Catalog, GalleryItem};
use crate::collections::{CollectionFilter, CollectionRules};
use crate::lightbox::{Lightbox, LightboxView};
use crate::mosaic_layout::{self, LayoutSeed, TileSize, Tint};
use serde::Serialize;
use std::sync::Arc;

/// Column count used before the viewport width is known.
pub const DEFAULT_COLUMNS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub url: String,
    pub alt_text: String,
    pub title: String,
    pub size: TileSize,
    pub tint: Tint,
    pub col_span: u8,
    pub row_span: u8,
    /// Position of this item in the full catalog.
    pub catalog_index: usize,
    /// Deferred-load hint for the image.
    pub lazy: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryView {
    pub seed: LayoutSeed,
    pub columns: usize,
    pub collections: Vec<String>,
    pub show_filters: bool,
    pub active_collection: String,
    pub image_count: usize,
    pub empty: bool,
    pub tiles: Vec<TileView>,
    pub lightbox: Option<LightboxView>,
}

/// State of one page load: catalog, selection, layout inputs and viewer.
///
/// Every handler is synchronous; the visible list and tile shapes are
/// derived on demand and never stored.
#[derive(Debug, Clone)]
pub struct GallerySession {
    catalog: Arc<Catalog>,
    rules: CollectionRules,
    seed: LayoutSeed,
    columns: usize,
    filter: CollectionFilter,
    lightbox: Lightbox,
}

impl GallerySession {
    pub fn new(catalog: Arc<Catalog>, rules: CollectionRules, seed: LayoutSeed) -> Self {
        let filter = CollectionFilter::new(&catalog, &rules);

        Self {
            catalog,
            rules,
            seed,
            columns: DEFAULT_COLUMNS,
            filter,
            lightbox: Lightbox::Closed,
        }
    }

    /// Swaps in a freshly built catalog and re-validates derived state.
    pub fn replace_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
        self.filter.refresh(&self.catalog, &self.rules);
        self.lightbox.clamp_to(self.catalog.len());
    }

    pub fn select_collection(&mut self, collection: &str) {
        self.filter.select(collection, &self.rules);
    }

    pub fn set_columns(&mut self, columns: usize) {
        self.columns = columns.max(1);
    }

    pub fn set_viewport_width(&mut self, width: u32) {
        self.set_columns(mosaic_layout::columns_for_width(width));
    }

    /// Opens the lightbox on the tile at `visible_index` of the current view.
    ///
    /// Returns the full-catalog index that was opened.
    pub fn open_tile(&mut self, visible_index: usize) -> Option<usize> {
        let (index, _) = self.indexed_visible().nth(visible_index)?;
        self.open_catalog_index(index).then_some(index)
    }

    pub fn open_catalog_index(&mut self, index: usize) -> bool {
        self.lightbox.open(index, self.catalog.len())
    }

    pub fn close_lightbox(&mut self) {
        self.lightbox.close();
    }

    pub fn prev(&mut self) {
        self.lightbox.prev(self.catalog.len());
    }

    pub fn next(&mut self) {
        self.lightbox.next(self.catalog.len());
    }

    pub fn seed(&self) -> LayoutSeed {
        self.seed
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn filter(&self) -> &CollectionFilter {
        &self.filter
    }

    pub fn lightbox(&self) -> Lightbox {
        self.lightbox
    }

    /// Visible items paired with their full-catalog index.
    fn indexed_visible(&self) -> impl Iterator<Item = (usize, &GalleryItem)> + '_ {
        self.catalog
            .iter()
            .enumerate()
            .filter(|(_, item)| self.filter.includes(item))
    }

    pub fn tiles(&self) -> Vec<TileView> {
        self.indexed_visible()
            .enumerate()
            .map(|(position, (catalog_index, item))| {
                let shape = mosaic_layout::tile_shape(position, self.columns, self.seed);
                TileView {
                    url: item.url.clone(),
                    alt_text: item.alt_text(),
                    title: item.name.clone(),
                    size: shape.size,
                    tint: shape.tint,
                    col_span: shape.size.col_span(),
                    row_span: shape.size.row_span(),
                    catalog_index,
                    lazy: true,
                }
            })
            .collect()
    }

    pub fn lightbox_view(&self) -> Option<LightboxView> {
        LightboxView::for_state(&self.catalog, self.lightbox)
    }

    pub fn view(&self) -> GalleryView {
        let tiles = self.tiles();

        GalleryView {
            seed: self.seed,
            columns: self.columns,
            collections: self.filter.collections().to_vec(),
            show_filters: self.filter.show_filters(),
            active_collection: self.filter.active().to_string(),
            image_count: tiles.len(),
            empty: tiles.is_empty(),
            tiles,
            lightbox: self.lightbox_view(),
        }
    }
}
