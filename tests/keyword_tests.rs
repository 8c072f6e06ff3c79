//! Deferred keyword propagation.

use set_script::core::FieldIndex;
use set_script::data::{Keyword, KeywordSlot, ValueRef};
use set_script::games::simple::SimpleGame;
use set_script::manager::SetScriptManager;
use set_script::CardId;

fn setup() -> (SetScriptManager, CardId, FieldIndex) {
    let mut m = SetScriptManager::with_expr_engine(SimpleGame::new().build());
    let card = m.new_card();
    let card = m.add_card(card).unwrap();
    let rules = m.set().game().card_field_index("rules").unwrap();
    m.set_value(ValueRef::Card(card, rules), "Flying. Whenever this attacks, scry 1.")
        .unwrap();
    let found = m.set().game().card_field_index("keywords_found").unwrap();
    (m, card, found)
}

fn found(m: &SetScriptManager, card: CardId, field: FieldIndex) -> String {
    m.set().value(ValueRef::Card(card, field)).unwrap().script_value().to_text()
}

/// Many match edits cost one database rebuild and one propagation.
#[test]
fn test_edits_batched_until_flush() {
    let (mut m, card, field) = setup();
    let kw = m.add_keyword(Keyword::new("Scry").with_match("scry")).unwrap();
    assert_eq!(found(&m, card, field), "Scry");

    let rebuilds = m.set().keyword_db().rebuild_count();
    let rounds = m.stats().rounds;
    for n in 0..10 {
        m.edit_keyword_text(kw, KeywordSlot::Match, format!("scry {n}")).unwrap();
    }
    assert!(m.has_deferred());
    assert_eq!(m.set().keyword_db().rebuild_count(), rebuilds);
    assert_eq!(m.stats().rounds, rounds);

    m.flush_deferred().unwrap();
    assert_eq!(m.set().keyword_db().rebuild_count(), rebuilds + 1);
    assert_eq!(m.stats().rounds, rounds + 1);
    // "scry 9" does not occur; "scry 1" would have.
    assert_eq!(found(&m, card, field), "");
}

/// Flushing with nothing deferred does nothing.
#[test]
fn test_flush_without_edits() {
    let (mut m, _, _) = setup();
    m.add_keyword(Keyword::new("Flying")).unwrap();
    let rebuilds = m.set().keyword_db().rebuild_count();
    let rounds = m.stats().rounds;

    m.flush_deferred().unwrap();
    assert_eq!(m.set().keyword_db().rebuild_count(), rebuilds);
    assert_eq!(m.stats().rounds, rounds);
}

/// Edits to non-matching slots are deferred but keep the database.
#[test]
fn test_reminder_edit_keeps_database() {
    let (mut m, _, _) = setup();
    let kw = m.add_keyword(Keyword::new("Flying")).unwrap();
    let rebuilds = m.set().keyword_db().rebuild_count();

    m.edit_keyword_text(kw, KeywordSlot::Reminder, "This creature can't be blocked except by flyers.")
        .unwrap();
    assert!(m.has_deferred());
    assert!(m.set().keyword_db().is_valid());

    m.flush_deferred().unwrap();
    assert!(!m.has_deferred());
    assert_eq!(m.set().keyword_db().rebuild_count(), rebuilds);
    assert_eq!(
        m.set().keyword(kw).unwrap().text(KeywordSlot::Reminder),
        "This creature can't be blocked except by flyers."
    );
}

/// Keyword list changes propagate immediately.
#[test]
fn test_list_changes_propagate() {
    let (mut m, card, field) = setup();
    let flying = m.add_keyword(Keyword::new("Flying")).unwrap();
    assert_eq!(found(&m, card, field), "Flying");

    m.remove_keyword(flying).unwrap();
    assert!(!m.has_deferred());
    assert_eq!(found(&m, card, field), "");
}

/// Editing a keyword's match slot through `set_value` is deferred too.
#[test]
fn test_value_edit_of_keyword_is_deferred() {
    let (mut m, card, field) = setup();
    let kw = m.add_keyword(Keyword::new("Haste")).unwrap();
    assert_eq!(found(&m, card, field), "");

    m.set_value(ValueRef::Keyword(kw, KeywordSlot::Match), "flying").unwrap();
    assert!(m.has_deferred());
    assert_eq!(found(&m, card, field), "");

    m.flush_deferred().unwrap();
    assert_eq!(found(&m, card, field), "Haste");
}

/// Texts of a fixed keyword cannot be edited through its values.
#[test]
fn test_fixed_keyword_rejects_value_edit() {
    let (mut m, card, field) = setup();
    let kw = m.add_keyword(Keyword::new("Scry").with_match("scry").fixed()).unwrap();

    assert!(!m.set_value(ValueRef::Keyword(kw, KeywordSlot::Match), "flying").unwrap());
    assert!(!m.has_deferred());
    let keyword = m.set().keyword(kw).unwrap();
    assert_eq!(keyword.text(KeywordSlot::Match), "scry");
    assert_eq!(keyword.value(KeywordSlot::Match).stored_text(), Some("scry"));
    assert_eq!(found(&m, card, field), "Scry");
}
