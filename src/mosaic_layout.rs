use serde::Serialize;
use std::fmt;

/// Rolls below this produce a 2x2 tile.
pub const LARGE_THRESHOLD: u32 = 15;
/// Rolls below this (and at or above `LARGE_THRESHOLD`) produce a 2x1 tile.
pub const WIDE_THRESHOLD: u32 = 30;
/// Rolls below this (and at or above `WIDE_THRESHOLD`) produce a 1x2 tile.
pub const TALL_THRESHOLD: u32 = 45;

/// Odd stride applied to the index before reducing the roll.
pub const INDEX_STRIDE: u64 = 7;
/// Narrower grids only ever get standard tiles.
pub const MIN_MOSAIC_COLUMNS: usize = 3;
/// Seeds are drawn from `0..=MAX_SEED`.
pub const MAX_SEED: u32 = 9999;

const ROLL_MODULUS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TileSize {
    Standard, // 1x1
    Large,    // 2x2
    Wide,     // 2 columns, 1 row
    Tall,     // 1 column, 2 rows
}

impl TileSize {
    pub fn col_span(self) -> u8 {
        match self {
            TileSize::Large | TileSize::Wide => 2,
            TileSize::Standard | TileSize::Tall => 1,
        }
    }

    pub fn row_span(self) -> u8 {
        match self {
            TileSize::Large | TileSize::Tall => 2,
            TileSize::Standard | TileSize::Wide => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileSize::Standard => "standard",
            TileSize::Large => "large",
            TileSize::Wide => "wide",
            TileSize::Tall => "tall",
        }
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tint {
    Vivid,
    Muted,
}

impl Tint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tint::Vivid => "vivid",
            Tint::Muted => "muted",
        }
    }
}

impl fmt::Display for Tint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileShape {
    pub size: TileSize,
    pub tint: Tint,
}

/// Per-page-load seed that drives the tile size pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LayoutSeed(u32);

impl LayoutSeed {
    /// Fixed seed, reduced into the valid range.
    pub fn new(value: u32) -> Self {
        Self(value % (MAX_SEED + 1))
    }

    /// Draws a seed uniformly from `0..=MAX_SEED`.
    pub fn random() -> Self {
        Self(rand::random_range(0..=MAX_SEED))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for LayoutSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pseudo-random roll in `0..100` for a tile.
pub fn roll(index: usize, seed: u32) -> u32 {
    let mixed = u64::from(seed).wrapping_add((index as u64).wrapping_mul(INDEX_STRIDE));
    (mixed % ROLL_MODULUS) as u32
}

pub fn size_for_roll(roll: u32, columns: usize) -> TileSize {
    if columns < MIN_MOSAIC_COLUMNS {
        return TileSize::Standard;
    }

    match roll {
        r if r < LARGE_THRESHOLD => TileSize::Large,
        r if r < WIDE_THRESHOLD => TileSize::Wide,
        r if r < TALL_THRESHOLD => TileSize::Tall,
        _ => TileSize::Standard,
    }
}

/// Checkerboard tint over the current column count.
pub fn tint_for(index: usize, columns: usize) -> Tint {
    let columns = columns.max(1);
    let row = index / columns;
    let col = index % columns;

    if (row + col) % 2 == 1 {
        Tint::Muted
    } else {
        Tint::Vivid
    }
}

/// Shape of the tile at `index` in a grid of `columns` for the given seed.
pub fn tile_shape(index: usize, columns: usize, seed: LayoutSeed) -> TileShape {
    TileShape {
        size: size_for_roll(roll(index, seed.value()), columns),
        tint: tint_for(index, columns),
    }
}

/// Column count for a viewport width in CSS pixels.
pub fn columns_for_width(width: u32) -> usize {
    if width >= 1280 {
        4
    } else if width >= 768 {
        3
    } else {
        2
    }
}
