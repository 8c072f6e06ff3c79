//! Evaluation context cache.
//!
//! One [`Context`] per stylesheet, created on first use and reused for every
//! card of that stylesheet. Creating a context binds the global variables,
//! runs the game and stylesheet init scripts, and triggers dependency
//! discovery for both. Asking for a card's context rebinds the card
//! variables on the shared context.

use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::core::{CardId, EngineConfig, ErrorReporter, StructuralError, StyleSheetId};
use crate::data::Set;
use crate::dependency::{init_game_dependencies, init_stylesheet_dependencies};
use crate::script::{vars, Context, Handle, ScriptEngine, ScriptValue};

/// Contexts keyed by stylesheet.
#[derive(Clone, Debug, Default)]
pub struct ContextCache {
    contexts: FxHashMap<StyleSheetId, Context>,
}

impl ContextCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The context of a stylesheet, created on first use.
    ///
    /// Init script failures are reported; the context is cached anyway.
    pub fn context_for_stylesheet<E: ScriptEngine + ?Sized>(
        &mut self,
        engine: &E,
        config: &EngineConfig,
        set: &mut Set,
        errors: &mut ErrorReporter,
        stylesheet: StyleSheetId,
    ) -> Result<&mut Context, StructuralError> {
        match self.contexts.entry(stylesheet) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let ctx = create(engine, config, set, errors, stylesheet)?;
                Ok(entry.insert(ctx))
            }
        }
    }

    /// The context of a card's stylesheet, with the card variables bound
    /// to `card`. `None` binds the set-scope variables.
    pub fn context_for_card<E: ScriptEngine + ?Sized>(
        &mut self,
        engine: &E,
        config: &EngineConfig,
        set: &mut Set,
        errors: &mut ErrorReporter,
        card: Option<CardId>,
    ) -> Result<&mut Context, StructuralError> {
        let stylesheet = set.stylesheet_for(card)?;
        if let Some(card) = card {
            set.ensure_extra_data(card, stylesheet)?;
        }
        let own_styling = match card {
            Some(card) => set.card(card)?.styling_data.is_some(),
            None => false,
        };
        let ctx = self.context_for_stylesheet(engine, config, set, errors, stylesheet)?;
        match card {
            Some(card) => {
                ctx.set_variable(vars::CARD, Handle::Card(card));
                ctx.set_variable(
                    vars::STYLING,
                    Handle::Styling {
                        stylesheet,
                        card: own_styling.then_some(card),
                    },
                );
                ctx.set_variable(vars::EXTRA_CARD_STYLE, Handle::ExtraCardStyle(stylesheet));
                ctx.set_variable(vars::EXTRA_CARD, Handle::ExtraCard { card, stylesheet });
            }
            None => {
                ctx.set_variable(vars::CARD, ScriptValue::Nil);
                ctx.set_variable(
                    vars::STYLING,
                    Handle::Styling {
                        stylesheet,
                        card: None,
                    },
                );
                ctx.set_variable(vars::EXTRA_CARD_STYLE, ScriptValue::Nil);
                ctx.set_variable(vars::EXTRA_CARD, ScriptValue::Nil);
            }
        }
        Ok(ctx)
    }

    /// Drop the context of a stylesheet; the next request recreates it.
    pub fn invalidate(&mut self, stylesheet: StyleSheetId) -> bool {
        self.contexts.remove(&stylesheet).is_some()
    }

    /// Drop every context.
    pub fn clear(&mut self) {
        self.contexts.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    #[must_use]
    pub fn contains(&self, stylesheet: StyleSheetId) -> bool {
        self.contexts.contains_key(&stylesheet)
    }
}

fn create<E: ScriptEngine + ?Sized>(
    engine: &E,
    config: &EngineConfig,
    set: &mut Set,
    errors: &mut ErrorReporter,
    stylesheet: StyleSheetId,
) -> Result<Context, StructuralError> {
    let mut ctx = Context::new(stylesheet);
    ctx.set_variable(vars::SET, Handle::Set);
    ctx.set_variable(vars::GAME, Handle::Game);
    ctx.set_variable(vars::STYLESHEET, Handle::StyleSheet(stylesheet));
    ctx.set_variable(vars::CARD_STYLE, Handle::CardStyle(stylesheet));

    // Placeholders until a card is bound.
    let first = set.cards().first().map(|card| card.id());
    if let Some(card) = first {
        set.ensure_extra_data(card, stylesheet)?;
    }
    ctx.set_variable(vars::CARD, first.map_or(ScriptValue::Nil, |c| Handle::Card(c).into()));
    ctx.set_variable(
        vars::STYLING,
        Handle::Styling {
            stylesheet,
            card: None,
        },
    );
    ctx.set_variable(vars::EXTRA_CARD_STYLE, Handle::ExtraCardStyle(stylesheet));
    ctx.set_variable(
        vars::EXTRA_CARD,
        first.map_or(ScriptValue::Nil, |card| {
            Handle::ExtraCard { card, stylesheet }.into()
        }),
    );

    // Init scripts run unscoped; their bindings stay in the context.
    if let Some(script) = &set.game().init_script {
        if let Err(error) = engine.evaluate(script, &mut ctx, set) {
            errors.report_init(format!("game {}", set.game().name), error);
        }
    }
    let sheet = set.stylesheet(stylesheet)?;
    if let Some(script) = &sheet.init_script {
        if let Err(error) = engine.evaluate(script, &mut ctx, set) {
            errors.report_init(format!("stylesheet {}", sheet.name), error);
        }
    }

    init_game_dependencies(engine, set, stylesheet)?;
    init_stylesheet_dependencies(engine, config, set, stylesheet)?;
    log::debug!("created context for stylesheet {stylesheet}");
    Ok(ctx)
}
