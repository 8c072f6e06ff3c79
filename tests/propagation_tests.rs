//! Propagation integration tests.
//!
//! These tests drive a `SetScriptManager` through its mutation API and check
//! that exactly the dependent values and styles are brought up to date.

use std::cell::RefCell;
use std::rc::Rc;

use set_script::core::{Age, ChangeMask, FieldIndex, GeometryConfig, ReportedError, ScriptError};
use set_script::data::{ContentLayout, Field, Game, Set, StyleListener, StyleSheet, ValueRef};
use set_script::games::simple::SimpleGame;
use set_script::manager::{ChangeListener, ChangeNotice, SetScriptManager};
use set_script::script::{
    Context, Expr, ExprEngine, Script, ScriptAction, ScriptEngine, ScriptValue, VariableReads,
    VariableRef,
};

/// Card fields: a, b = a + "b", c = b + "c", broken, after = a + "!".
/// Set fields: label, shout = card list size + label.
fn chain_set() -> Set {
    let game = Game::new("chain")
        .with_card_field(Field::text("a"))
        .with_card_field(Field::text("b").with_script(Expr::concat([Expr::card("a"), Expr::text("b")])))
        .with_card_field(Field::text("c").with_script(Expr::concat([Expr::card("b"), Expr::text("c")])))
        .with_card_field(Field::text("broken").with_script(Expr::fail("no such thing")))
        .with_card_field(Field::text("after").with_script(Expr::concat([Expr::card("a"), Expr::text("!")])))
        .with_card_field(Field::text("labelled").with_script(Expr::concat([
            Expr::set("label"),
            Expr::text(":"),
            Expr::card("a"),
        ])))
        .with_set_field(Field::text("label").with_initial("L"))
        .with_set_field(Field::text("shout").with_script(Expr::concat([
            Expr::set("label"),
            Expr::cards().count(),
        ])));
    let sheet = StyleSheet::for_game("plain", &game, &GeometryConfig::default());
    Set::new(game, sheet).unwrap()
}

fn text(m: &SetScriptManager<impl ScriptEngine>, loc: ValueRef) -> String {
    m.set().value(loc).unwrap().script_value().to_text()
}

fn card_field(set: &Set, name: &str) -> FieldIndex {
    set.game().card_field_index(name).unwrap()
}

#[derive(Default)]
struct Notices {
    seen: RefCell<Vec<ChangeNotice>>,
}

impl ChangeListener for Notices {
    fn on_change(&self, notice: &ChangeNotice) {
        self.seen.borrow_mut().push(notice.clone());
    }
}

/// Editing a value recomputes the chain of fields reading it.
#[test]
fn test_transitive_dependents_recomputed() {
    let mut m = SetScriptManager::with_expr_engine(chain_set());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    let set = m.set();
    let (a, c, after) = (card_field(set, "a"), card_field(set, "c"), card_field(set, "after"));

    m.set_value(ValueRef::Card(card, a), "x").unwrap();
    assert_eq!(text(&m, ValueRef::Card(card, c)), "xbc");
    assert_eq!(text(&m, ValueRef::Card(card, after)), "x!");
}

/// Values of other cards are left alone.
#[test]
fn test_edit_scoped_to_card() {
    let mut m = SetScriptManager::with_expr_engine(chain_set());
    let first = m.new_card();
    let second = m.new_card();
    let ids = m.add_cards(vec![first, second]).unwrap();
    let b = card_field(m.set(), "b");
    let a = card_field(m.set(), "a");
    let before = m.set().value(ValueRef::Card(ids[1], b)).unwrap().age();

    m.set_value(ValueRef::Card(ids[0], a), "q").unwrap();
    assert_eq!(text(&m, ValueRef::Card(ids[0], b)), "qb");
    assert_eq!(text(&m, ValueRef::Card(ids[1], b)), "b");
    assert_eq!(m.set().value(ValueRef::Card(ids[1], b)).unwrap().age(), before);
}

/// A set value read by card scripts updates every card.
#[test]
fn test_set_value_reaches_all_cards() {
    let mut m = SetScriptManager::with_expr_engine(chain_set());
    let cards = vec![m.new_card(), m.new_card(), m.new_card()];
    let ids = m.add_cards(cards).unwrap();
    let label = m.set().game().set_field_index("label").unwrap();
    let labelled = card_field(m.set(), "labelled");

    m.set_value(ValueRef::Set(label), "K").unwrap();
    for id in ids {
        assert_eq!(text(&m, ValueRef::Card(id, labelled)), "K:");
    }
}

/// Card list changes update what reads the card list.
#[test]
fn test_card_list_dependents() {
    let mut m = SetScriptManager::with_expr_engine(chain_set());
    let shout = ValueRef::Set(m.set().game().set_field_index("shout").unwrap());
    let cards = vec![m.new_card(), m.new_card()];
    let ids = m.add_cards(cards).unwrap();
    assert_eq!(text(&m, shout), "L2");

    m.reorder_cards(&[ids[1], ids[0]]).unwrap();
    assert_eq!(m.set().card_ids(), vec![ids[1], ids[0]]);
    assert_eq!(text(&m, shout), "L2");

    m.remove_cards(&[ids[0]]).unwrap();
    assert_eq!(text(&m, shout), "L1");
}

/// Script failures are reported, leave the value's age alone and do not
/// stop the rest of the pass.
#[test]
fn test_failure_isolation() {
    let mut m = SetScriptManager::with_expr_engine(chain_set());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    m.take_errors();
    let broken = card_field(m.set(), "broken");
    let after = card_field(m.set(), "after");

    m.update_all().unwrap();

    let errors = m.take_errors();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ReportedError::Script(error) => {
            assert!(error.to_string().contains("while updating card value 'broken'"));
            assert_eq!(error.root(), &ScriptError::Raised("no such thing".into()));
        }
        other => panic!("unexpected report {other:?}"),
    }
    assert_eq!(m.set().value(ValueRef::Card(card, broken)).unwrap().age(), Age::ZERO);
    assert!(m.set().value(ValueRef::Card(card, after)).unwrap().age() > Age::ZERO);
    assert_eq!(text(&m, ValueRef::Card(card, after)), "!");
}

/// A second full update with unchanged inputs notifies nothing.
#[test]
fn test_idempotent_update_all() {
    let mut m = SetScriptManager::with_expr_engine(chain_set());
    let card = m.new_card();
    m.add_card(card).unwrap();
    m.update_all().unwrap();

    let notices = Rc::new(Notices::default());
    let listener: Rc<dyn ChangeListener> = notices.clone();
    m.add_change_listener(&listener);
    m.update_all().unwrap();
    assert!(notices
        .seen
        .borrow()
        .iter()
        .all(|n| !matches!(n, ChangeNotice::Value { .. })));
}

/// Mutually dependent fields settle within one round.
#[test]
fn test_cycle_terminates() {
    let game = Game::new("cycle")
        .with_card_field(Field::text("p").with_script(Expr::concat([Expr::card("q"), Expr::text("p")])))
        .with_card_field(Field::text("q").with_script(Expr::concat([Expr::card("p"), Expr::text("q")])));
    let sheet = StyleSheet::for_game("plain", &game, &GeometryConfig::default());
    let mut m = SetScriptManager::with_expr_engine(Set::new(game, sheet).unwrap());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();

    let before = m.stats();
    m.set_value(ValueRef::Card(card, FieldIndex(0)), "seed").unwrap();
    let after = m.stats();

    // p itself, then q, then p is skipped.
    assert_eq!(after.evaluated - before.evaluated, 2);
    assert_eq!(after.skipped - before.skipped, 1);
    let p = text(&m, ValueRef::Card(card, FieldIndex(0)));
    let q = text(&m, ValueRef::Card(card, FieldIndex(1)));
    assert!(q.starts_with(&p));
}

/// A field that only copies another one forwards changes to its own
/// dependents.
#[test]
fn test_copy_forwarding() {
    let mut m = SetScriptManager::with_expr_engine(SimpleGame::new().build());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    let name = card_field(m.set(), "name");
    let heading = card_field(m.set(), "heading");

    m.set_value(ValueRef::Card(card, name), "Ogre").unwrap();
    assert_eq!(text(&m, ValueRef::Card(card, heading)), "Ogre ");

    let sheet = m.set().stylesheet_id();
    assert!(m.change_log().history().iter().any(|n| matches!(
        n,
        ChangeNotice::Style { stylesheet, field, extra: false, changes }
            if *stylesheet == sheet && *field == heading && *changes == ChangeMask::OTHER
    )));
}

/// Editing a styling value invalidates the styles that read it.
#[test]
fn test_styling_edit_invalidates_style() {
    let mut m = SetScriptManager::with_expr_engine(SimpleGame::new().build());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    m.update_all().unwrap();

    let sheet = m.set().stylesheet_id();
    let frame = m.set().stylesheet(sheet).unwrap().styling_field_index("frame").unwrap();
    let name = card_field(m.set(), "name");
    m.set_value(
        ValueRef::Styling {
            stylesheet: sheet,
            card: None,
            field: frame,
        },
        "modern",
    )
    .unwrap();
    assert!(m.set().stylesheet(sheet).unwrap().card_style()[name].needs_refresh());

    m.update_styles(card, false).unwrap();
    let style = &m.set().stylesheet(sheet).unwrap().card_style()[name];
    assert!(!style.needs_refresh());
    assert_eq!(style.mask.get(), "mask-modern");
}

#[derive(Default)]
struct Changes {
    seen: RefCell<Vec<ChangeMask>>,
}

impl StyleListener for Changes {
    fn on_style_change(&self, changes: ChangeMask) {
        self.seen.borrow_mut().push(changes);
    }
}

/// Reported content metrics re-run content-dependent styles only.
#[test]
fn test_content_layout_updates_content_styles() {
    let mut m = SetScriptManager::with_expr_engine(SimpleGame::new().build());
    let card = m.new_card();
    m.add_card(card).unwrap();
    m.update_all().unwrap();

    let sheet = m.set().stylesheet_id();
    let rules = card_field(m.set(), "rules");
    let name = card_field(m.set(), "name");
    let rules_seen = Rc::new(Changes::default());
    let name_seen = Rc::new(Changes::default());
    let listener: Rc<dyn StyleListener> = rules_seen.clone();
    m.add_style_listener(sheet, rules, false, &listener).unwrap();
    let other: Rc<dyn StyleListener> = name_seen.clone();
    m.add_style_listener(sheet, name, false, &other).unwrap();

    let layout = ContentLayout {
        width: 300.0,
        height: 40.0,
        lines: 3,
    };
    assert!(m.set_content_layout(sheet, rules, false, layout.clone()).unwrap());
    assert!(!m.set_content_layout(sheet, rules, false, layout).unwrap());

    let style = &m.set().stylesheet(sheet).unwrap().card_style()[rules];
    assert_eq!(*style.height.get(), 50.0);
    assert_eq!(
        rules_seen.seen.borrow().as_slice(),
        &[ChangeMask::SIZE | ChangeMask::ALREADY_PREPARED]
    );
    assert!(name_seen.seen.borrow().is_empty());
}

/// Switching a card to another stylesheet gives it extra data there and
/// recomputes values reading the stylesheet.
#[test]
fn test_card_stylesheet_change() {
    let simple = SimpleGame::new();
    let mut set = simple.build();
    let alternate = simple.stylesheet(set.game()).with_card_size(300.0, 400.0);
    let alternate = set.register_stylesheet(alternate).unwrap();

    let mut m = SetScriptManager::with_expr_engine(set);
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    m.set_card_stylesheet(card, Some(alternate)).unwrap();

    assert_eq!(m.set().stylesheet_for(Some(card)).unwrap(), alternate);
    assert!(m.set().extra_values(card, alternate).is_ok());
    m.update_styles(card, false).unwrap();
    assert!(m.contexts().contains(alternate));
}

/// Evaluates `Source("announce")` by copying the card name into the set's
/// first field through a requested action; everything else goes to the
/// expression engine.
struct AnnouncingEngine {
    inner: ExprEngine,
}

impl ScriptEngine for AnnouncingEngine {
    fn evaluate(&self, script: &Script, ctx: &mut Context, set: &Set) -> Result<ScriptValue, ScriptError> {
        match script {
            Script::Source(source) if source == "announce" => {
                let name = self.inner.eval(&Expr::card("name"), ctx, set)?;
                ctx.perform(ScriptAction::SetValue {
                    value: ValueRef::Set(FieldIndex(0)),
                    content: name.clone(),
                });
                Ok(name)
            }
            _ => self.inner.evaluate(script, ctx, set),
        }
    }

    fn static_dependencies(&self, script: &Script) -> VariableReads {
        match script {
            Script::Source(source) if source == "announce" => {
                let mut reads = VariableReads::new();
                reads.add(VariableRef::CardField("name".into()));
                reads
            }
            _ => self.inner.static_dependencies(script),
        }
    }
}

/// Actions requested by scripts run after the round that requested them.
#[test]
fn test_script_requested_action() {
    let game = Game::new("announce")
        .with_card_field(Field::text("name"))
        .with_card_field(Field::text("echo").with_script(Script::source("announce")))
        .with_set_field(Field::text("last_named"))
        .with_set_field(Field::text("banner").with_script(Expr::concat([
            Expr::text("latest: "),
            Expr::set("last_named"),
        ])));
    let sheet = StyleSheet::for_game("plain", &game, &GeometryConfig::default());
    let engine = AnnouncingEngine {
        inner: ExprEngine::new(),
    };
    let mut m = SetScriptManager::new(Set::new(game, sheet).unwrap(), engine);
    let card = m.new_card();
    let card = m.add_card(card).unwrap();

    m.set_value(ValueRef::Card(card, FieldIndex(0)), "Shiva").unwrap();
    assert_eq!(text(&m, ValueRef::Card(card, FieldIndex(1))), "Shiva");
    assert_eq!(text(&m, ValueRef::Set(FieldIndex(0))), "Shiva");
    assert_eq!(text(&m, ValueRef::Set(FieldIndex(1))), "latest: Shiva");
    assert!(m.take_errors().is_empty());
}
