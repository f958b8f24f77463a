//! Greedy rejection-sampling packer for the three word cloud bands.
//!
//! Every placement is drawn uniformly from its region and checked against all
//! positions already taken in the current pass, across regions. After
//! `max_attempts` rejections the last candidate is kept even if it overlaps.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::Region;

pub const MIN_FONT: f64 = 12.0;
pub const MAX_FONT: f64 = 60.0;
pub const DEFAULT_MAX_ATTEMPTS: usize = 150;
/// Clearance around a new word, as a multiple of its own size.
pub const PADDING_FACTOR: f64 = 1.5;

const BAND_INSET_X: f64 = 0.05; // of band width
const BAND_INSET_Y: f64 = 0.10; // of canvas height

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn band_width(&self) -> f64 {
        self.width / 3.0
    }

    pub fn region_bounds(&self, region: Region) -> Bounds {
        let band = self.band_width();
        let i = region.band_index() as f64;
        Bounds {
            x0: band * (i + BAND_INSET_X),
            x1: band * (i + 1.0 - BAND_INSET_X),
            y0: self.height * BAND_INSET_Y,
            y1: self.height * (1.0 - BAND_INSET_Y),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

#[cfg(test)]
impl Bounds {
    pub(crate) fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Occupied {
    x: f64,
    y: f64,
    size: f64,
}

/// Positions taken during one render pass.
#[derive(Debug, Clone, Default)]
pub struct PositionRegistry {
    taken: Vec<Occupied>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64, y: f64, size: f64) {
        self.taken.push(Occupied { x, y, size });
    }

    pub(crate) fn len(&self) -> usize {
        self.taken.len()
    }

    /// True if a word of `size` centred at (x, y) crowds any taken position.
    pub fn crowds(&self, x: f64, y: f64, size: f64) -> bool {
        let padding = size * PADDING_FACTOR;
        self.taken
            .iter()
            .any(|p| (x - p.x).hypot(y - p.y) < padding + p.size / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    /// False when the attempt cap ran out and the position may overlap.
    pub clear: bool,
}

/// Font size from a term's total relative to the heaviest term in its region.
pub fn font_size(total: f64, region_max: f64) -> f64 {
    let max = if region_max > 0.0 { region_max } else { 1.0 };
    (MIN_FONT + (total / max) * (MAX_FONT - MIN_FONT)).clamp(MIN_FONT, MAX_FONT)
}

pub struct LayoutEngine<R = StdRng> {
    rng: R,
    max_attempts: usize,
}

impl LayoutEngine<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> LayoutEngine<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn place(&mut self, size: f64, bounds: &Bounds, registry: &PositionRegistry) -> Placement {
        let mut x = bounds.x0;
        let mut y = bounds.y0;
        for _ in 0..self.max_attempts {
            x = bounds.x0 + self.rng.random::<f64>() * (bounds.x1 - bounds.x0);
            y = bounds.y0 + self.rng.random::<f64>() * (bounds.y1 - bounds.y0);
            if !registry.crowds(x, y, size) {
                return Placement { x, y, clear: true };
            }
        }
        Placement { x, y, clear: false }
    }

    /// Whole-degree tilt in [-15, 15].
    pub fn rotation(&mut self) -> i32 {
        self.rng.random_range(-15..=15)
    }
}
