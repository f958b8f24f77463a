use serde::{Serialize, Serializer};
use std::fmt;

use crate::models::{Maxima, Party, Region, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn hex(v: u32) -> Self {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Straight per-channel linear blend, `t` clamped to [0, 1].
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/* ------------------------------- palettes --------------------------------- */

/// Light → dark blues for conservative-only terms.
pub const CONSERVATIVE_GRADIENT: [Rgb; 5] = [
    Rgb::hex(0xb3d9f2),
    Rgb::hex(0x73b3e6),
    Rgb::hex(0x3689c9),
    Rgb::hex(0x1a6fb4),
    Rgb::hex(0x0f528a),
];

/// Light → dark oranges for liberal-only terms.
pub const LIBERAL_GRADIENT: [Rgb; 5] = [
    Rgb::hex(0xffd9b3),
    Rgb::hex(0xffb380),
    Rgb::hex(0xff8c4d),
    Rgb::hex(0xe66a2c),
    Rgb::hex(0xc44d1c),
];

pub const CONSERVATIVE_ANCHOR: Rgb = Rgb::hex(0x1890ff);
pub const LIBERAL_ANCHOR: Rgb = Rgb::hex(0xfaad14);
pub const NEUTRAL_GRAY: Rgb = Rgb::hex(0x8c8c8c);

/// Header colours for the three bands.
pub const CONSERVATIVE_HEADER: Rgb = Rgb::hex(0x409eff);
pub const SHARED_HEADER: Rgb = NEUTRAL_GRAY;
pub const LIBERAL_HEADER: Rgb = Rgb::hex(0xe6a23c);

pub fn gradient(party: Party) -> &'static [Rgb; 5] {
    match party {
        Party::Conservative => &CONSERVATIVE_GRADIENT,
        Party::Liberal => &LIBERAL_GRADIENT,
    }
}

/// Index into a 5-step gradient; `max` of zero maps to the lightest step.
pub fn bucket(weight: f64, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    let ratio = (weight / max).min(0.999);
    ((ratio * 5.0).floor().max(0.0) as usize).min(4)
}

/// Maps a term's dual weight and region to its fill.
#[derive(Debug, Clone, Copy)]
pub struct ColorEncoder {
    maxima: Maxima,
}

impl ColorEncoder {
    pub fn new(maxima: Maxima) -> Self {
        Self { maxima }
    }

    pub fn color_of(&self, term: &Term, region: Region) -> Rgb {
        match region.owner() {
            Some(party) => gradient(party)[bucket(term.weight(party), self.maxima.of(party))],
            None => {
                let total = term.total();
                if total <= 0.0 {
                    return NEUTRAL_GRAY;
                }
                CONSERVATIVE_ANCHOR.lerp(LIBERAL_ANCHOR, 1.0 - term.conservative / total)
            }
        }
    }
}
