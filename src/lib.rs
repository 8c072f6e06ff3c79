//! # set-script
//!
//! Incremental, dependency-tracked script recomputation for card set
//! documents.
//!
//! A set holds cards, set-level values, styling data and keywords. Many
//! values are computed by scripts reading other values, and every field has
//! a style whose layout can be scripted too. When something is edited, only
//! what depends on it is recomputed.
//!
//! ## Design Principles
//!
//! 1. **Discovery, not declaration**: dependencies are found by asking each
//!    script what it reads, once per game and stylesheet. Each field keeps
//!    the list of what must be notified when it changes.
//!
//! 2. **Age-based rounds**: every recompute stamps the value with a logical
//!    age. A round skips anything stamped after it started, so cycles
//!    terminate and nothing is recomputed twice in a round.
//!
//! 3. **Errors do not stop propagation**: a failing script is reported and
//!    the round moves on; only structural problems are returned as errors.
//!
//! ## Modules
//!
//! - `core`: ids, field maps, ages, change masks, configuration, errors
//! - `script`: script values, the expression language, engines, contexts
//! - `dependency`: dependency records and discovery
//! - `data`: games, stylesheets, fields, values, styles, cards, keywords, sets
//! - `geometry`: automatic side selection for style boxes
//! - `manager`: context cache, events, change log and the scheduler
//! - `games`: a sample game

pub mod core;
pub mod script;
pub mod dependency;
pub mod data;
pub mod geometry;
pub mod manager;
pub mod games;

// Re-export commonly used types
pub use crate::core::{
    Age, AgeClock, CardId, ChangeMask, EngineConfig, EngineError, ErrorReporter, FieldIndex,
    FieldMap, GeometryConfig, KeywordId, ReportedError, ScriptError, StructuralError, StyleSheetId,
};

pub use crate::script::{
    Context, Expr, ExprEngine, Handle, Script, ScriptAction, ScriptEngine, ScriptValue, Scriptable,
    VariableReads, VariableRef,
};

pub use crate::dependency::{Dependencies, Dependency, DependencyKind};

pub use crate::data::{
    Card, ContentLayout, Descriptor, DependentList, Field, FieldKind, Game, Keyword, KeywordSlot,
    Set, Style, StyleListener, StyleSheet, Value, ValueRef,
};

pub use crate::geometry::{AutomaticSide, GeometryResolver};

pub use crate::manager::{
    ChangeListener, ChangeLog, ChangeNotice, ContextCache, Delay, RoundStats, SetEvent,
    SetScriptManager,
};
