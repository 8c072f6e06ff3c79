//! Dependency records and discovery.
//!
//! - `Dependency` / `DependencyKind`: one dependent of a field
//! - `Dependencies`: append-only dependent list
//! - `discovery`: turns script reads into records, once per game and
//!   stylesheet

pub mod discovery;
pub mod record;

pub use discovery::{init_game_dependencies, init_stylesheet_dependencies};
pub use record::{Dependencies, Dependency, DependencyKind};
