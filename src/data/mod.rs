//! Document model: schemas, values, styles and the set.
//!
//! ## Key Types
//!
//! - `Game`: card and set field schemas
//! - `StyleSheet`: styles per card field, extra card fields, styling fields
//! - `Field` / `Value`: schema entry and its content for one owner
//! - `Style`: scriptable layout of one field
//! - `Card`, `Keyword`, `Set`: the document itself
//! - `ValueRef`: the address of any value in a set

pub mod card;
pub mod field;
pub mod game;
pub mod keyword;
pub mod set;
pub mod style;
pub mod stylesheet;
pub mod value;

pub use card::Card;
pub use field::{Field, FieldKind};
pub use game::{DependentList, Game};
pub use keyword::{Keyword, KeywordDatabase, KeywordSlot};
pub use set::Set;
pub use style::{
    ContentLayout, Descriptor, Style, StyleListener, StyleListeners, StyleUpdate, TextStyle,
};
pub use stylesheet::StyleSheet;
pub use value::{Backing, Value, ValueContent, ValueRef};
