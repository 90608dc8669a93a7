use log::debug;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::iter::Peekable;

/// A single image as it appears in the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub name: String,
    pub url: String,
    pub collection: String,
}

impl GalleryItem {
    /// File name without its final extension, used as the image alt text.
    pub fn alt_text(&self) -> String {
        let stem = match self.name.rfind('.') {
            Some(pos) => &self.name[..pos],
            None => self.name.as_str(),
        };

        if stem.is_empty() {
            "Photo".to_string()
        } else {
            stem.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub logo_file: String,
    pub fallback_collection: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            logo_file: "logo.png".to_string(),
            fallback_collection: "Portfolio".to_string(),
        }
    }
}

/// Ordered, immutable list of gallery items for one page load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<GalleryItem>,
}

impl Catalog {
    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GalleryItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GalleryItem> {
        self.items.iter()
    }

    /// Position of the item with the given url in the full catalog.
    pub fn position_of(&self, url: &str) -> Option<usize> {
        self.items.iter().position(|item| item.url == url)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a GalleryItem;
    type IntoIter = std::slice::Iter<'a, GalleryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Builds the catalog from discovered assets, keyed by `/`-separated path.
///
/// The reserved logo asset is dropped wherever it lives, the first entry
/// wins for any repeated url, and the result is in natural order by name.
pub fn build_catalog(assets: &BTreeMap<String, String>, options: &CatalogOptions) -> Catalog {
    let mut seen_urls = HashSet::new();
    let mut excluded = 0usize;
    let mut duplicates = 0usize;
    let mut items = Vec::with_capacity(assets.len());

    for (path, reference) in assets {
        let mut segments = path.rsplit('/');
        let name = segments.next().unwrap_or_default().to_string();
        let collection = segments
            .next()
            .filter(|folder| !folder.is_empty())
            .unwrap_or(options.fallback_collection.as_str())
            .to_string();

        if is_logo(&name, reference, &options.logo_file) {
            excluded += 1;
            continue;
        }

        if !seen_urls.insert(reference.clone()) {
            duplicates += 1;
            continue;
        }

        items.push(GalleryItem {
            name,
            url: reference.clone(),
            collection,
        });
    }

    items.sort_by(|a, b| natural_cmp(&a.name, &b.name).then_with(|| a.url.cmp(&b.url)));

    debug!(
        "Built catalog with {} items ({} logo assets excluded, {} duplicate urls skipped)",
        items.len(),
        excluded,
        duplicates
    );

    Catalog { items }
}

fn is_logo(name: &str, reference: &str, logo_file: &str) -> bool {
    let reference_name = reference.rsplit('/').next().unwrap_or(reference);
    name.eq_ignore_ascii_case(logo_file) || reference_name.eq_ignore_ascii_case(logo_file)
}

/// Compares two strings treating runs of ASCII digits as numbers.
///
/// Text runs compare case-insensitively. Strings that are equal under those
/// rules fall back to a plain byte comparison so the ordering stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let left_run = take_digits(&mut left);
                let right_run = take_digits(&mut right);
                let ord = compare_digit_runs(&left_run, &right_run);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(l), Some(r)) => {
                left.next();
                right.next();
                let ord = l.to_lowercase().cmp(r.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn take_digits<I: Iterator<Item = char>>(chars: &mut Peekable<I>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.next_if(|c| c.is_ascii_digit()) {
        run.push(c);
    }
    run
}

fn compare_digit_runs(left: &str, right: &str) -> Ordering {
    let left = left.trim_start_matches('0');
    let right = right.trim_start_matches('0');

    // Same digit count means lexical order equals numeric order
    left.len().cmp(&right.len()).then_with(|| left.cmp(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(path, url)| (path.to_string(), url.to_string()))
            .collect()
    }

    #[test]
    fn test_natural_sort_orders_numbers_by_value() {
        let mut names = vec!["img2.jpg", "img10.jpg", "img1.jpg"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, vec!["img1.jpg", "img2.jpg", "img10.jpg"]);
    }

    #[test]
    fn test_natural_cmp_edge_cases() {
        assert_eq!(natural_cmp("a", "a"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
        assert_eq!(natural_cmp("Beach", "apple"), Ordering::Greater);
        assert_eq!(natural_cmp("shot 9", "shot 10"), Ordering::Less);
        assert_eq!(natural_cmp("007.jpg", "7.jpg"), Ordering::Less);
        assert_eq!(natural_cmp("2024-01-05", "2024-1-6"), Ordering::Less);
    }

    #[test]
    fn test_build_catalog_extracts_name_and_collection() {
        let catalog = build_catalog(
            &assets(&[("/src/assets/dance1/a.jpg", "/assets/dance1/a.jpg")]),
            &CatalogOptions::default(),
        );

        let item = catalog.get(0).unwrap();
        assert_eq!(item.name, "a.jpg");
        assert_eq!(item.collection, "dance1");
        assert_eq!(item.url, "/assets/dance1/a.jpg");
    }

    #[test]
    fn test_build_catalog_uses_fallback_collection() {
        let catalog = build_catalog(
            &assets(&[("top.jpg", "/assets/top.jpg"), ("/root.jpg", "/assets/root.jpg")]),
            &CatalogOptions::default(),
        );

        assert_eq!(catalog.len(), 2);
        assert!(catalog.iter().all(|item| item.collection == "Portfolio"));
    }

    #[test]
    fn test_build_catalog_excludes_logo_in_any_folder() {
        let catalog = build_catalog(
            &assets(&[
                ("logo.png", "/assets/logo.png"),
                ("website/logo.png", "/assets/website/logo.png"),
                ("cars/LOGO.PNG", "/assets/cars/LOGO.PNG"),
                ("cars/1.jpg", "/assets/cars/1.jpg"),
            ]),
            &CatalogOptions::default(),
        );

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().name, "1.jpg");
    }

    #[test]
    fn test_build_catalog_unique_by_url() {
        let catalog = build_catalog(
            &assets(&[("a/1.jpg", "/shared.jpg"), ("b/1.jpg", "/shared.jpg")]),
            &CatalogOptions::default(),
        );

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().collection, "a");
    }

    #[test]
    fn test_build_catalog_sorts_naturally_across_collections() {
        let catalog = build_catalog(
            &assets(&[
                ("b/img10.jpg", "/b/img10.jpg"),
                ("a/img2.jpg", "/a/img2.jpg"),
                ("c/img1.jpg", "/c/img1.jpg"),
            ]),
            &CatalogOptions::default(),
        );

        let names: Vec<&str> = catalog.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["img1.jpg", "img2.jpg", "img10.jpg"]);
    }

    #[test]
    fn test_empty_assets_yield_empty_catalog() {
        let catalog = build_catalog(&BTreeMap::new(), &CatalogOptions::default());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_alt_text_strips_extension() {
        let item = GalleryItem {
            name: "my.photo.jpg".to_string(),
            url: "/x".to_string(),
            collection: "c".to_string(),
        };
        assert_eq!(item.alt_text(), "my.photo");

        let hidden = GalleryItem {
            name: ".jpg".to_string(),
            ..item
        };
        assert_eq!(hidden.alt_text(), "Photo");
    }

    #[test]
    fn test_position_of() {
        let catalog = build_catalog(
            &assets(&[("a/1.jpg", "/a/1.jpg"), ("a/2.jpg", "/a/2.jpg")]),
            &CatalogOptions::default(),
        );
        assert_eq!(catalog.position_of("/a/2.jpg"), Some(1));
        assert_eq!(catalog.position_of("/missing.jpg"), None);
    }
}
