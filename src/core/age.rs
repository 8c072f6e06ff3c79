//! Logical timestamps for staleness tracking.
//!
//! Every value records the `Age` of its last successful recompute. A
//! propagation round captures a start age before seeding; any value whose
//! age is at least the start age has already been brought up to date in the
//! round and is skipped. Ages come from one `AgeClock` per session and only
//! ever increase, so a later recompute of the same value in the same round is
//! always a no-op.

use serde::{Deserialize, Serialize};

/// A logical timestamp. `Age::ZERO` means "never computed".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Age(pub u64);

impl Age {
    /// The age of a value that has never been computed.
    pub const ZERO: Age = Age(0);

    /// Get the raw counter value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Age {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Age({})", self.0)
    }
}

/// Session-scoped source of strictly increasing ages.
///
/// ```
/// use set_script::core::AgeClock;
///
/// let mut clock = AgeClock::new();
/// let a = clock.tick();
/// let b = clock.tick();
/// assert!(b > a);
/// ```
#[derive(Clone, Debug, Default)]
pub struct AgeClock {
    last: u64,
}

impl AgeClock {
    /// Create a clock. The first tick returns `Age(1)`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock and return the new age.
    pub fn tick(&mut self) -> Age {
        self.last += 1;
        Age(self.last)
    }

    /// The most recently issued age.
    #[must_use]
    pub fn now(&self) -> Age {
        Age(self.last)
    }
}
