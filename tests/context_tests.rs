//! Context sharing through the manager.

use set_script::core::{GeometryConfig, ReportedError, ScriptError};
use set_script::data::{Field, Game, Set, StyleSheet, ValueRef};
use set_script::games::simple::SimpleGame;
use set_script::manager::SetScriptManager;
use set_script::script::{vars, Context, Expr, Handle, ScriptValue};

fn greeting_set(game_init: Expr) -> Set {
    let game = Game::new("greeter")
        .with_card_field(Field::text("name"))
        .with_card_field(Field::text("hello").with_script(Expr::concat([
            Expr::var("greeting"),
            Expr::text(", "),
            Expr::card("name"),
        ])))
        .with_init_script(game_init);
    let sheet = StyleSheet::for_game("plain", &game, &GeometryConfig::default())
        .with_init_script(Expr::let_("accent", Expr::text("blue")));
    Set::new(game, sheet).unwrap()
}

/// Bindings made by init scripts are visible to value scripts.
#[test]
fn test_init_bindings_visible() {
    let mut m = SetScriptManager::with_expr_engine(greeting_set(Expr::let_("greeting", Expr::text("hi"))));
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    let name = m.set().game().card_field_index("name").unwrap();
    let hello = m.set().game().card_field_index("hello").unwrap();

    m.set_value(ValueRef::Card(card, name), "Ada").unwrap();
    assert_eq!(
        m.set().value(ValueRef::Card(card, hello)).unwrap().script_value(),
        ScriptValue::from("hi, Ada")
    );
    let ctx = m.context_for_stylesheet(m.set().stylesheet_id()).unwrap();
    assert_eq!(ctx.variable("accent"), Some(&ScriptValue::from("blue")));
    assert!(m.take_errors().is_empty());
}

/// A failing init script is reported once and the context is still used.
#[test]
fn test_init_failure_reported_once() {
    let mut m = SetScriptManager::with_expr_engine(greeting_set(Expr::fail("no greeting today")));
    let cards = vec![m.new_card(), m.new_card()];
    m.add_cards(cards).unwrap();
    m.update_all().unwrap();

    let errors = m.take_errors();
    let init: Vec<_> = errors
        .iter()
        .filter_map(|e| match e {
            ReportedError::Initialization { target, error } => Some((target.clone(), error.clone())),
            ReportedError::Script(_) => None,
        })
        .collect();
    assert_eq!(
        init,
        vec![("game greeter".to_string(), ScriptError::Raised("no greeting today".into()))]
    );
    // `greeting` is unbound, so every hello value fails too.
    assert!(errors
        .iter()
        .any(|e| matches!(e, ReportedError::Script(s) if *s.root() == ScriptError::UnknownVariable("greeting".into()))));
    assert_eq!(m.contexts().len(), 1);
}

/// Cards on one stylesheet share a context; the card variables follow the
/// card asked for.
#[test]
fn test_cards_share_context() {
    let mut m = SetScriptManager::with_expr_engine(SimpleGame::new().build());
    let cards = vec![m.new_card(), m.new_card()];
    let ids = m.add_cards(cards).unwrap();

    let first = m.context_for_card(Some(ids[0])).unwrap() as *const Context;
    let ctx = m.context_for_card(Some(ids[1])).unwrap();
    assert!(std::ptr::eq(first, ctx));
    assert_eq!(ctx.variable(vars::CARD), Some(&ScriptValue::Handle(Handle::Card(ids[1]))));
    assert_eq!(m.contexts().len(), 1);
}

/// Each stylesheet gets its own context.
#[test]
fn test_context_per_stylesheet() {
    let simple = SimpleGame::new();
    let mut set = simple.build();
    let other = set.register_stylesheet(simple.stylesheet(set.game())).unwrap();
    let mut m = SetScriptManager::with_expr_engine(set);
    let cards = vec![m.new_card(), m.new_card()];
    let ids = m.add_cards(cards).unwrap();

    m.set_card_stylesheet(ids[1], Some(other)).unwrap();
    let main = m.context_for_card(Some(ids[0])).unwrap().stylesheet();
    let alternate = m.context_for_card(Some(ids[1])).unwrap().stylesheet();
    assert_ne!(main, alternate);
    assert_eq!(alternate, other);
    assert_eq!(m.contexts().len(), 2);
}

/// An invalidated context is rebuilt, running the init scripts again.
#[test]
fn test_invalidated_context_reruns_init() {
    let mut m = SetScriptManager::with_expr_engine(greeting_set(Expr::fail("again")));
    let sheet = m.set().stylesheet_id();
    m.context_for_stylesheet(sheet).unwrap();
    assert_eq!(m.take_errors().len(), 1);

    assert!(m.invalidate_context(sheet));
    assert!(!m.contexts().contains(sheet));
    m.context_for_stylesheet(sheet).unwrap();
    assert_eq!(m.take_errors().len(), 1);
    assert!(m.contexts().contains(sheet));
}

/// Bindings made by a default script stay inside that script.
#[test]
fn test_default_script_bindings_stay_local() {
    let game = Game::new("scoped")
        .with_card_field(Field::text("a").with_default(Expr::let_("leak", Expr::text("from a"))))
        .with_card_field(Field::text("b").with_script(Expr::var("leak")));
    let sheet = StyleSheet::for_game("plain", &game, &GeometryConfig::default());
    let mut m = SetScriptManager::with_expr_engine(Set::new(game, sheet).unwrap());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();

    let a = m.set().game().card_field_index("a").unwrap();
    let b = m.set().game().card_field_index("b").unwrap();
    assert_eq!(
        m.set().value(ValueRef::Card(card, a)).unwrap().script_value(),
        ScriptValue::from("from a")
    );
    assert_eq!(
        m.set().value(ValueRef::Card(card, b)).unwrap().script_value(),
        ScriptValue::Nil
    );
    assert!(m
        .take_errors()
        .iter()
        .any(|e| matches!(e, ReportedError::Script(s) if *s.root() == ScriptError::UnknownVariable("leak".into()))));
    let ctx = m.context_for_card(Some(card)).unwrap();
    assert_eq!(ctx.variable("leak"), None);
}
