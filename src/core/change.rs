//! Change categories reported to listeners.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// What kind of change a recompute produced.
    ///
    /// Renderers use the categories to decide how much work a notification
    /// needs: a size change forces relayout, a mask change forces a new clip,
    /// and so on. An empty mask means "no change".
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ChangeMask: u8 {
        /// Position, size or rotation changed.
        const SIZE = 1;
        /// The content mask changed.
        const MASK = 1 << 1;
        /// Visibility changed.
        const VISIBILITY = 1 << 2;
        /// Any other style parameter changed.
        const OTHER = 1 << 3;
        /// The listener's content was already prepared for this change.
        const ALREADY_PREPARED = 1 << 4;
    }
}

impl ChangeMask {
    /// The "no change" sentinel.
    pub const NONE: ChangeMask = ChangeMask::empty();

    /// `flag` if `changed`, otherwise nothing.
    #[must_use]
    pub fn when(changed: bool, flag: ChangeMask) -> ChangeMask {
        if changed {
            flag
        } else {
            ChangeMask::NONE
        }
    }

    /// Check if anything besides the `ALREADY_PREPARED` tag is set.
    #[must_use]
    pub fn is_change(self) -> bool {
        !self.difference(ChangeMask::ALREADY_PREPARED).is_empty()
    }
}
