//! Frame colours.
//!
//! Colours travel through the crate as packed 32-bit ARGB values ([`Argb`]).
//! Backends convert them to whatever their target expects: RGBA8 bytes for
//! pixel buffers, unit floats for vector APIs.
//!
//! ```rust
//! use surfacing::render::Argb;
//!
//! let c = Argb::new(0x88bf360c);
//! assert_eq!(c.alpha(), 0x88);
//! assert_eq!(c.to_rgba8(), [0xbf, 0x36, 0x0c, 0x88]);
//! assert_eq!(c.to_string(), "88bf360c");
//! ```

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// Packed 32-bit colour, alpha in the high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Argb(pub u32);

/// Colours cycled through by successive draws.
pub const FRAME_PALETTE: [Argb; 6] = [
    Argb(0x88bf360c),
    Argb(0xcc3e2723),
    Argb(0xaaffd600),
    Argb(0x6664dd17),
    Argb(0x880277bd),
    Argb(0xff880e4f),
];

impl Argb {
    /// Fully transparent black. Used to clear a target before it is released.
    pub const TRANSPARENT: Argb = Argb(0);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }
    #[inline]
    pub fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }
    #[inline]
    pub fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }
    #[inline]
    pub fn blue(&self) -> u8 {
        self.0 as u8
    }

    /// Byte order expected by RGBA8 pixel buffers.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.red(), self.green(), self.blue(), self.alpha()]
    }

    /// Channels as `(r, g, b, a)` in the range `0.0 ..= 1.0`.
    pub fn to_unit_rgba(&self) -> (f64, f64, f64, f64) {
        (
            self.red() as f64 / 255.0,
            self.green() as f64 / 255.0,
            self.blue() as f64 / 255.0,
            self.alpha() as f64 / 255.0,
        )
    }
}

impl Display for Argb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}
