//! Full-screen viewer state.
//!
//! Indices always refer to the full catalog, never to a filtered view, and
//! every move wraps around both ends.

use crate::catalog::Catalog;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lightbox {
    #[default]
    Closed,
    Open(usize),
}

impl Lightbox {
    /// Opens at `index`; out-of-range indices leave the state unchanged.
    pub fn open(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        *self = Lightbox::Open(index);
        true
    }

    pub fn close(&mut self) {
        *self = Lightbox::Closed;
    }

    pub fn prev(&mut self, len: usize) {
        if let Lightbox::Open(index) = *self {
            if len > 0 {
                *self = Lightbox::Open((index % len + len - 1) % len);
            }
        }
    }

    pub fn next(&mut self, len: usize) {
        if let Lightbox::Open(index) = *self {
            if len > 0 {
                *self = Lightbox::Open((index + 1) % len);
            }
        }
    }

    /// Re-validates the open index after the catalog length changed.
    pub fn clamp_to(&mut self, len: usize) {
        if let Lightbox::Open(index) = *self {
            *self = if len == 0 {
                Lightbox::Closed
            } else {
                Lightbox::Open(index.min(len - 1))
            };
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            Lightbox::Closed => None,
            Lightbox::Open(index) => Some(*index),
        }
    }
}

/// What the overlay needs to display the open image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LightboxView {
    pub url: String,
    pub alt_text: String,
    pub index: usize,
    pub total: usize,
    pub position_label: String,
}

impl LightboxView {
    pub fn for_index(catalog: &Catalog, index: usize) -> Option<Self> {
        let item = catalog.get(index)?;
        let total = catalog.len();

        Some(Self {
            url: item.url.clone(),
            alt_text: item.alt_text(),
            index,
            total,
            position_label: format!("{}/{}", index + 1, total),
        })
    }

    pub fn for_state(catalog: &Catalog, state: Lightbox) -> Option<Self> {
        state
            .index()
            .and_then(|index| Self::for_index(catalog, index))
    }
}
