//! Box geometry of styles.
//!
//! - `AutomaticSide`: which descriptor on each axis is derived
//! - `GeometryResolver`: chooses and recomputes derived descriptors

pub mod resolver;
pub mod side;

pub use resolver::GeometryResolver;
pub use side::AutomaticSide;
