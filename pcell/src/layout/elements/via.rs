//! Via array generators.
//!
//! These generators tile square cuts inside a rectangular region,
//! centring the resulting array within the region.

use pcgeom::{Dims, Rect, Span};
use serde::{Deserialize, Serialize};

use crate::layout::cell::Element;
use crate::layout::group::elements::ElementGroup;
use crate::layout::layers::{LayerKey, LayerSpec};

/// Cut dimensions for a via array.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ViaRules {
    /// Edge length of one square cut.
    pub size: i64,
    /// Enclosure of the cuts by the surrounding layer.
    pub enclosure: i64,
    /// Edge-to-edge spacing between adjacent cuts.
    pub spacing: i64,
}

impl ViaRules {
    pub const fn new(size: i64, enclosure: i64, spacing: i64) -> Self {
        Self {
            size,
            enclosure,
            spacing,
        }
    }

    /// The number of cuts that fit along a range of length `len`.
    ///
    /// Always at least one.
    pub fn count(&self, len: i64) -> usize {
        let pitch = self.size + self.spacing;
        let mut n = len.div_euclid(pitch);
        if pitch * n - self.spacing + 2 * self.enclosure > len {
            n -= 1;
        }
        n.max(1) as usize
    }

    /// The distance from the start of a range of length `len` to the first of `n` cuts.
    pub fn offset(&self, len: i64, n: usize) -> i64 {
        let n = n as i64;
        (len - n * self.size - (n - 1) * self.spacing).div_euclid(2)
    }

    fn starts(&self, range: Span) -> impl Iterator<Item = i64> {
        let n = self.count(range.length());
        let first = range.start() + self.offset(range.length(), n);
        let pitch = self.size + self.spacing;
        (0..n as i64).map(move |i| first + i * pitch)
    }
}

/// Tiles cuts of `layer` inside the region spanned by `x_range` and `y_range`.
///
/// The number of cuts along each axis is the largest count whose array,
/// padded by the enclosure on both ends, fits in the range. At least one cut is
/// always drawn, so a range smaller than one enclosed cut yields a single cut
/// centred on the range that may overhang it.
pub fn via_generator(
    x_range: Span,
    y_range: Span,
    rules: ViaRules,
    layer: LayerKey,
) -> ElementGroup {
    let mut group = ElementGroup::new();
    let cut = Dims::square(rules.size);
    for y in rules.starts(y_range) {
        for x in rules.starts(x_range) {
            let rect = Rect::from_corner_and_dims((x, y).into(), cut);
            group.add(Element::new(LayerSpec::drawing(layer), rect));
        }
    }
    group
}
