use crate::catalog::{Catalog, GalleryItem};
use std::collections::BTreeSet;

/// Labels that drive which collections are offered as filters.
#[derive(Debug, Clone)]
pub struct CollectionRules {
    /// General-site collection that is never offered as a filter when
    /// other collections exist.
    pub hidden_label: String,
    /// Collection selected when the current selection is no longer valid.
    pub default_collection: String,
}

impl Default for CollectionRules {
    fn default() -> Self {
        Self {
            hidden_label: "website".to_string(),
            default_collection: "dance1".to_string(),
        }
    }
}

/// Distinct collection names in lexicographic order.
///
/// With more than one collection the hidden label is removed; a lone
/// collection is always kept.
pub fn collections(catalog: &Catalog, hidden_label: &str) -> Vec<String> {
    let unique: BTreeSet<&str> = catalog
        .iter()
        .map(|item| item.collection.as_str())
        .collect();

    if unique.len() > 1 {
        unique
            .into_iter()
            .filter(|name| !name.eq_ignore_ascii_case(hidden_label))
            .map(str::to_string)
            .collect()
    } else {
        unique.into_iter().map(str::to_string).collect()
    }
}

pub fn show_filters(collections: &[String]) -> bool {
    collections.len() > 1
}

/// Returns the selection that should be active for the given collection set.
///
/// An empty selection means "show all".
pub fn reconcile_selection(
    current: &str,
    collections: &[String],
    default_collection: &str,
) -> String {
    if !show_filters(collections) {
        return String::new();
    }

    if collections.iter().any(|name| name == current) {
        return current.to_string();
    }

    if collections.iter().any(|name| name == default_collection) {
        default_collection.to_string()
    } else {
        // Configured default is absent, pick the first selectable one
        collections[0].clone()
    }
}

fn is_visible(item: &GalleryItem, active: &str, show_filters: bool) -> bool {
    !show_filters || active.is_empty() || item.collection == active
}

/// Items to render for the current selection, in catalog order.
pub fn visible<'a>(
    catalog: &'a Catalog,
    active: &str,
    show_filters: bool,
) -> Vec<&'a GalleryItem> {
    catalog
        .iter()
        .filter(|item| is_visible(item, active, show_filters))
        .collect()
}

/// Selectable collections together with the reconciled active selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFilter {
    collections: Vec<String>,
    active: String,
}

impl CollectionFilter {
    pub fn new(catalog: &Catalog, rules: &CollectionRules) -> Self {
        let mut filter = Self {
            collections: Vec::new(),
            active: String::new(),
        };
        filter.refresh(catalog, rules);
        filter
    }

    /// Recomputes the collection set and keeps the selection valid.
    pub fn refresh(&mut self, catalog: &Catalog, rules: &CollectionRules) {
        self.collections = collections(catalog, &rules.hidden_label);
        self.active =
            reconcile_selection(&self.active, &self.collections, &rules.default_collection);
    }

    /// Applies a user selection; invalid choices are corrected, never rejected.
    pub fn select(&mut self, collection: &str, rules: &CollectionRules) {
        self.active =
            reconcile_selection(collection, &self.collections, &rules.default_collection);
    }

    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn show_filters(&self) -> bool {
        show_filters(&self.collections)
    }

    pub fn includes(&self, item: &GalleryItem) -> bool {
        is_visible(item, &self.active, self.show_filters())
    }
}
