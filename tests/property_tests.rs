//! Property tests over random field graphs.
//!
//! Every generated game has one plain card field `f0` and scripted fields
//! reading exactly one other field, so cycles stay cheap to evaluate. Full
//! updates only settle on acyclic graphs; a cycle of suffixing fields grows
//! on every pass.

use std::cell::RefCell;
use std::collections::HashMap;

use proptest::prelude::*;
use set_script::core::{FieldIndex, GeometryConfig, ScriptError};
use set_script::data::{Field, Game, Set, StyleSheet, ValueRef};
use set_script::manager::{ChangeNotice, SetScriptManager};
use set_script::script::{Context, Expr, ExprEngine, Script, ScriptEngine, ScriptValue, VariableReads};
use set_script::CardId;

/// Counts evaluations per script.
#[derive(Default)]
struct CountingEngine {
    inner: ExprEngine,
    counts: RefCell<HashMap<String, usize>>,
}

impl CountingEngine {
    fn key(script: &Script) -> String {
        serde_json::to_string(script).unwrap()
    }

    fn reset(&self) {
        self.counts.borrow_mut().clear();
    }
}

impl ScriptEngine for CountingEngine {
    fn evaluate(&self, script: &Script, ctx: &mut Context, set: &Set) -> Result<ScriptValue, ScriptError> {
        *self.counts.borrow_mut().entry(Self::key(script)).or_default() += 1;
        self.inner.evaluate(script, ctx, set)
    }

    fn static_dependencies(&self, script: &Script) -> VariableReads {
        self.inner.static_dependencies(script)
    }
}

/// `(source, copy)` per scripted field: it reads `f{source}`, either as a
/// plain copy or with its own suffix.
type Shape = Vec<(usize, bool)>;

fn script_for(i: usize, source: usize, copy: bool) -> Script {
    let read = Expr::card(format!("f{source}"));
    if copy {
        read.into()
    } else {
        Expr::concat([read, Expr::text(i.to_string())]).into()
    }
}

fn build(shape: &Shape) -> (Set, HashMap<String, usize>) {
    let mut game = Game::new("graph").with_card_field(Field::text("f0"));
    let mut multiplicity = HashMap::new();
    for (n, &(source, copy)) in shape.iter().enumerate() {
        let i = n + 1;
        let script = script_for(i, source, copy);
        *multiplicity.entry(CountingEngine::key(&script)).or_default() += 1;
        game = game.with_card_field(Field::text(format!("f{i}")).with_script(script));
    }
    let sheet = StyleSheet::for_game("plain", &game, &GeometryConfig::default());
    (Set::new(game, sheet).unwrap(), multiplicity)
}

fn cyclic_shape() -> impl Strategy<Value = Shape> {
    (1usize..7).prop_flat_map(|n| prop::collection::vec((0..=n, any::<bool>()), n))
}

/// Fields only read fields with a lower index.
fn acyclic_shape() -> impl Strategy<Value = Shape> {
    (1usize..7)
        .prop_flat_map(|n| prop::collection::vec((0usize..8, any::<bool>()), n))
        .prop_map(|shape| {
            shape
                .into_iter()
                .enumerate()
                .map(|(n, (source, copy))| (source % (n + 1), copy))
                .collect()
        })
}

fn manager(shape: &Shape) -> (SetScriptManager<CountingEngine>, CardId, HashMap<String, usize>) {
    let (set, multiplicity) = build(shape);
    let mut m = SetScriptManager::new(set, CountingEngine::default());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    (m, card, multiplicity)
}

fn values(m: &SetScriptManager<CountingEngine>, card: CardId) -> Vec<ScriptValue> {
    m.set().card(card).unwrap().data.iter().map(|v| v.script_value()).collect()
}

fn value_notices(m: &SetScriptManager<CountingEngine>) -> usize {
    m.change_log()
        .history()
        .iter()
        .filter(|n| matches!(n, ChangeNotice::Value { .. }))
        .count()
}

proptest! {
    #[test]
    fn test_each_value_evaluated_once_per_edit(
        shape in cyclic_shape(),
        edits in prop::collection::vec("[a-z]{1,3}", 1..4),
    ) {
        let (mut m, card, multiplicity) = manager(&shape);
        for edit in edits {
            m.engine().reset();
            let before = m.stats();
            m.set_value(ValueRef::Card(card, FieldIndex(0)), edit).unwrap();
            let after = m.stats();

            prop_assert!(after.evaluated - before.evaluated <= (shape.len() + 1) as u64);
            for (key, count) in m.engine().counts.borrow().iter() {
                prop_assert!(*count <= multiplicity[key], "{key} evaluated {count} times");
            }
        }
        prop_assert!(m.take_errors().is_empty());
    }

    #[test]
    fn test_update_all_is_idempotent(
        shape in acyclic_shape(),
        edit in "[a-z]{1,3}",
    ) {
        let (mut m, card, _) = manager(&shape);
        m.set_value(ValueRef::Card(card, FieldIndex(0)), edit).unwrap();
        m.update_all().unwrap();
        let settled = values(&m, card);
        let notices = value_notices(&m);

        m.update_all().unwrap();
        prop_assert_eq!(values(&m, card), settled);
        prop_assert_eq!(value_notices(&m), notices);
    }

    #[test]
    fn test_update_all_matches_fresh_set(
        shape in acyclic_shape(),
        edits in prop::collection::vec("[a-z]{1,3}", 1..4),
    ) {
        let (mut m, card, _) = manager(&shape);
        for edit in &edits {
            m.set_value(ValueRef::Card(card, FieldIndex(0)), edit.as_str()).unwrap();
        }
        m.update_all().unwrap();

        let (mut fresh, fresh_card, _) = manager(&shape);
        let last = edits.last().cloned().unwrap_or_default();
        fresh.set_value(ValueRef::Card(fresh_card, FieldIndex(0)), last).unwrap();
        fresh.update_all().unwrap();

        prop_assert_eq!(values(&m, card), values(&fresh, fresh_card));
    }

    /// Along a chain every edit reaches the end in one round.
    #[test]
    fn test_chain_converges(
        len in 1usize..8,
        edits in prop::collection::vec("[a-z]{1,3}", 1..4),
    ) {
        let shape: Shape = (0..len).map(|n| (n, false)).collect();
        let (mut m, card, _) = manager(&shape);
        for edit in edits {
            m.set_value(ValueRef::Card(card, FieldIndex(0)), edit.as_str()).unwrap();
            let suffix: String = (1..=len).map(|i| i.to_string()).collect();
            let end = m.set().value(ValueRef::Card(card, FieldIndex(len as u32))).unwrap();
            prop_assert_eq!(end.script_value().to_text(), format!("{edit}{suffix}"));
        }
    }
}
