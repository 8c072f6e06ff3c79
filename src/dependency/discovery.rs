//! Dependency discovery.
//!
//! Runs once per game and once per stylesheet, when the first context for
//! them is created. Every script is asked what it reads; each read of a
//! field adds a record to that field's dependent list, naming the script's
//! owner. Reads of the card list, the keyword list or the `stylesheet`
//! variable go to the game-wide lists instead.
//!
//! Styles are also checked for reads of rendered content; the result is
//! stored on the style once.

use crate::core::{EngineConfig, StructuralError, StyleSheetId};
use crate::data::{DependentList, Set};
use crate::script::{ScriptEngine, VariableReads, VariableRef};

use super::record::{Dependency, DependencyKind};

/// Discover dependencies of the game's card and set field scripts.
/// Returns false if this already happened.
pub fn init_game_dependencies<E: ScriptEngine + ?Sized>(
    engine: &E,
    set: &mut Set,
    stylesheet: StyleSheetId,
) -> Result<bool, StructuralError> {
    if set.game().dependencies_initialized() {
        return Ok(false);
    }
    set.game_mut().dependencies_initialized = true;

    let game = set.game();
    let plans: Vec<(VariableReads, Dependency)> = game
        .card_fields()
        .iter()
        .map(|f| (f.script_reads(engine), Dependency::card_field(f.index())))
        .chain(
            game.set_fields()
                .iter()
                .map(|f| (f.script_reads(engine), Dependency::set_field(f.index()))),
        )
        .collect();

    let mut added = 0;
    for (reads, dependency) in &plans {
        added += register(set, stylesheet, reads, *dependency)?;
    }
    log::trace!(
        "discovered {added} dependencies for game '{}'",
        set.game().name
    );
    Ok(true)
}

/// Discover dependencies of a stylesheet's extra card fields and card
/// styles, and classify its styles as content dependent or not.
/// Returns false if this already happened.
pub fn init_stylesheet_dependencies<E: ScriptEngine + ?Sized>(
    engine: &E,
    config: &EngineConfig,
    set: &mut Set,
    stylesheet: StyleSheetId,
) -> Result<bool, StructuralError> {
    let sheet = set.stylesheet_mut(stylesheet)?;
    if sheet.dependencies_initialized() {
        return Ok(false);
    }
    sheet.dependencies_initialized = true;

    let sheet = set.stylesheet(stylesheet)?;
    let mut plans: Vec<(VariableReads, Dependency)> = sheet
        .extra_card_fields()
        .iter()
        .map(|f| {
            (
                f.script_reads(engine),
                Dependency::extra_card_field(f.index(), stylesheet),
            )
        })
        .collect();
    let mut classes = Vec::new();
    for (extra, styles) in [(false, sheet.card_style()), (true, sheet.extra_card_style())] {
        for style in styles {
            let reads = style.script_reads(engine);
            classes.push((extra, style.field(), reads.is_content_dependent(config)));
            if !extra {
                plans.push((reads, Dependency::card_style(style.field(), stylesheet)));
            }
        }
    }

    let mut added = 0;
    for (reads, dependency) in &plans {
        added += register(set, stylesheet, reads, *dependency)?;
    }
    let sheet = set.stylesheet_mut(stylesheet)?;
    for (extra, field, content_dependent) in classes {
        if let Some(style) = sheet.style_mut(field, extra) {
            style.classify(content_dependent);
        }
    }
    log::trace!("discovered {added} dependencies for stylesheet '{}'", sheet.name);
    Ok(true)
}

/// Add `dependency` to the dependent list of everything `reads` names.
/// Reads of unknown names are skipped; evaluating them reports the error.
fn register(
    set: &mut Set,
    stylesheet: StyleSheetId,
    reads: &VariableReads,
    dependency: Dependency,
) -> Result<usize, StructuralError> {
    let mut added = 0;
    for read in reads.iter() {
        added += usize::from(add_to(set, stylesheet, read, dependency)?);
    }

    let copy = match dependency.kind {
        DependencyKind::CardField => Some(Dependency::card_copy(dependency.index)),
        DependencyKind::SetField => Some(Dependency::set_copy(dependency.index)),
        _ => None,
    };
    if let (Some(forward), Some(copy)) = (reads.forward(), copy) {
        added += usize::from(add_to(set, stylesheet, forward, copy)?);
    }
    Ok(added)
}

fn add_to(
    set: &mut Set,
    stylesheet: StyleSheetId,
    read: &VariableRef,
    dependency: Dependency,
) -> Result<bool, StructuralError> {
    let added = match read {
        VariableRef::CardField(name) => match set.game().card_field_index(name) {
            Some(index) => set.game_mut().card_fields_mut()[index].add_dependent(dependency),
            None => false,
        },
        VariableRef::SetField(name) => match set.game().set_field_index(name) {
            Some(index) => set.game_mut().set_fields_mut()[index].add_dependent(dependency),
            None => false,
        },
        VariableRef::StylingField(name) => {
            let sheet = set.stylesheet_mut(stylesheet)?;
            match sheet.styling_field_index(name) {
                Some(index) => sheet.styling_fields_mut()[index].add_dependent(dependency),
                None => false,
            }
        }
        VariableRef::ExtraCardField(name) => {
            let sheet = set.stylesheet_mut(stylesheet)?;
            match sheet.extra_card_field_index(name) {
                Some(index) => sheet.extra_card_fields_mut()[index].add_dependent(dependency),
                None => false,
            }
        }
        VariableRef::CardList => set.game_mut().add_dependent(DependentList::Cards, dependency),
        VariableRef::Keywords => set.game_mut().add_dependent(DependentList::Keywords, dependency),
        VariableRef::StyleSheet => set
            .game_mut()
            .add_dependent(DependentList::StyleSheet, dependency),
        VariableRef::Variable(_) | VariableRef::StyleMember { .. } => false,
    };
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldIndex, GeometryConfig};
    use crate::data::{Descriptor, Field, Game, StyleSheet};
    use crate::script::{Expr, ExprEngine};

    fn set() -> Set {
        let game = Game::new("g")
            .with_card_field(Field::text("name"))
            .with_card_field(Field::text("title").with_script(Expr::card("name")))
            .with_card_field(
                Field::text("count_text").with_script(Expr::concat([Expr::cards().count()])),
            )
            .with_set_field(Field::text("summary").with_script(Expr::concat([
                Expr::set("summary_prefix"),
                Expr::text(": "),
                Expr::cards().count(),
            ])))
            .with_set_field(Field::text("summary_prefix"));
        let sheet = StyleSheet::for_game("s", &game, &GeometryConfig::default())
            .with_card_style(FieldIndex(0), |s| {
                s.scripted(Descriptor::Width, Expr::card("count_text").count())
            })
            .with_card_style(FieldIndex(1), |s| {
                s.scripted(Descriptor::Height, Expr::card_style("title", "content_height"))
            });
        Set::new(game, sheet).unwrap()
    }

    #[test]
    fn test_game_discovery_runs_once() {
        let engine = ExprEngine::new();
        let mut set = set();
        let sheet = set.stylesheet_id();
        assert!(init_game_dependencies(&engine, &mut set, sheet).unwrap());
        assert!(!init_game_dependencies(&engine, &mut set, sheet).unwrap());

        let name = &set.game().card_fields()[FieldIndex(0)];
        assert!(name.dependent_scripts().contains(&Dependency::card_field(FieldIndex(1))));
        assert!(name.dependent_scripts().contains(&Dependency::card_copy(FieldIndex(1))));
        assert_eq!(name.dependent_scripts().len(), 2);
    }

    #[test]
    fn test_game_wide_lists() {
        let engine = ExprEngine::new();
        let mut set = set();
        let sheet = set.stylesheet_id();
        init_game_dependencies(&engine, &mut set, sheet).unwrap();

        let cards = set.game().dependents(DependentList::Cards);
        assert!(cards.contains(&Dependency::card_field(FieldIndex(2))));
        assert!(cards.contains(&Dependency::set_field(FieldIndex(0))));

        let prefix = &set.game().set_fields()[FieldIndex(1)];
        assert!(prefix.dependent_scripts().contains(&Dependency::set_field(FieldIndex(0))));
    }

    #[test]
    fn test_stylesheet_discovery() {
        let engine = ExprEngine::new();
        let config = EngineConfig::default();
        let mut set = set();
        let sheet = set.stylesheet_id();
        assert!(init_stylesheet_dependencies(&engine, &config, &mut set, sheet).unwrap());
        assert!(!init_stylesheet_dependencies(&engine, &config, &mut set, sheet).unwrap());

        let count_text = &set.game().card_fields()[FieldIndex(2)];
        assert!(count_text
            .dependent_scripts()
            .contains(&Dependency::card_style(FieldIndex(0), sheet)));

        let styles = set.stylesheet(sheet).unwrap().card_style();
        assert!(styles[FieldIndex(0)].is_classified());
        assert!(!styles[FieldIndex(0)].content_dependent());
        assert!(styles[FieldIndex(1)].content_dependent());
        assert!(!styles[FieldIndex(2)].content_dependent());
    }
}
