//! Which box descriptors are derived from the others.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// The derived descriptor on each axis. One horizontal and one vertical
    /// flag are set once the resolver has run; empty means not yet chosen.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct AutomaticSide: u8 {
        /// `left = right - width`
        const LEFT = 1;
        /// `width = right - left`
        const WIDTH = 1 << 1;
        /// `right = left + width`
        const RIGHT = 1 << 2;
        /// Centered: `left`/`right` keep their midpoint
        const LR = 1 << 3;
        /// `top = bottom - height`
        const TOP = 1 << 4;
        /// `height = bottom - top`
        const HEIGHT = 1 << 5;
        /// `bottom = top + height`
        const BOTTOM = 1 << 6;
        /// Centered vertically
        const TB = 1 << 7;
    }
}

impl AutomaticSide {
    /// Horizontal flags.
    pub const HORIZONTAL: AutomaticSide = AutomaticSide::LEFT
        .union(AutomaticSide::WIDTH)
        .union(AutomaticSide::RIGHT)
        .union(AutomaticSide::LR);

    /// Vertical flags.
    pub const VERTICAL: AutomaticSide = AutomaticSide::TOP
        .union(AutomaticSide::HEIGHT)
        .union(AutomaticSide::BOTTOM)
        .union(AutomaticSide::TB);

    /// Check if both axes were chosen.
    #[must_use]
    pub fn is_known(self) -> bool {
        self.intersects(Self::HORIZONTAL) && self.intersects(Self::VERTICAL)
    }
}
