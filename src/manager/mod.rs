//! Script management: contexts, events, change notification and the
//! propagation scheduler.
//!
//! ## Key Types
//!
//! - `SetScriptManager`: owns a set and keeps its scripted values and
//!   styles up to date
//! - `ContextCache`: one evaluation context per stylesheet
//! - `SetEvent`: the mutations the scheduler reacts to
//! - `ChangeLog` / `ChangeNotice` / `ChangeListener`: what changed
//!
//! ## Example
//!
//! ```
//! use set_script::data::ValueRef;
//! use set_script::games::simple::SimpleGame;
//! use set_script::manager::SetScriptManager;
//!
//! let mut manager = SetScriptManager::with_expr_engine(SimpleGame::new().build());
//! let card = manager.new_card();
//! let card = manager.add_card(card).unwrap();
//!
//! let name = manager.set().game().card_field_index("name").unwrap();
//! let title = manager.set().game().card_field_index("title").unwrap();
//! manager.set_value(ValueRef::Card(card, name), "Goblin Guide").unwrap();
//!
//! let title = manager.set().value(ValueRef::Card(card, title)).unwrap();
//! assert!(title.script_value().to_text().starts_with("Goblin Guide"));
//! ```

pub mod cache;
pub mod event;
pub mod history;
pub mod scheduler;

pub use cache::ContextCache;
pub use event::SetEvent;
pub use history::{ChangeListener, ChangeLog, ChangeNotice};
pub use scheduler::{Delay, RoundStats, SetScriptManager};
