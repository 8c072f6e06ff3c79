//! The propagation scheduler.
//!
//! `SetScriptManager` owns a set and keeps every scripted value and style in
//! it up to date. Each mutation event starts a round:
//!
//! 1. A start age is taken from the clock.
//! 2. The worklist is seeded, either with the edited value's recompute and
//!    its field's dependents, or with one of the game-wide dependent lists.
//! 3. Items are popped in FIFO order. An item whose value was already
//!    recomputed at or after the start age is skipped; otherwise it is
//!    recomputed, and if its content changed, its own dependents are
//!    appended.
//!
//! Ages only increase, so a value is recomputed at most once per round and
//! every round terminates, cycles included.
//!
//! ## Re-entrancy
//!
//! Scripts may ask for document actions through their context. Those, and
//! any event delivered while a round is draining, are queued and run as new
//! rounds afterwards, in order.
//!
//! ## Thread affinity
//!
//! The manager is `!Send` and asserts in debug builds that it is only used
//! from the thread that created it.

use std::collections::VecDeque;
use std::rc::Rc;
use std::thread::ThreadId;

use bitflags::bitflags;
use rustc_hash::FxHashSet;

use crate::core::{
    Age, AgeClock, CardId, ChangeMask, EngineConfig, EngineError, ErrorReporter, FieldIndex, KeywordId,
    ReportedError, StructuralError, StyleSheetId,
};
use crate::data::{
    Card, ContentLayout, DependentList, Keyword, KeywordSlot, Set, StyleListener, ValueRef,
};
use crate::dependency::{Dependency, DependencyKind};
use crate::script::{Context, ExprEngine, ScriptAction, ScriptEngine, ScriptValue};

use super::cache::ContextCache;
use super::event::SetEvent;
use super::history::{ChangeListener, ChangeLog, ChangeNotice};

bitflags! {
    /// Work postponed until [`SetScriptManager::flush_deferred`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Delay: u8 {
        /// Keyword dependents must be recomputed.
        const KEYWORDS = 1;
    }
}

/// Counters over the manager's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Rounds that drained a non-empty worklist.
    pub rounds: u64,
    /// Values recomputed.
    pub evaluated: u64,
    /// Worklist items skipped because they were already up to date.
    pub skipped: u64,
    /// Recomputes that changed content.
    pub changed: u64,
}

#[derive(Clone, Debug)]
enum QueuedWork {
    Event(SetEvent),
    Action(ScriptAction),
}

/// Keeps the scripted values and styles of a set up to date.
pub struct SetScriptManager<E: ScriptEngine = ExprEngine> {
    set: Set,
    engine: E,
    config: EngineConfig,
    contexts: ContextCache,
    clock: AgeClock,
    errors: ErrorReporter,
    log: ChangeLog,
    delay: Delay,
    draining: bool,
    queued: VecDeque<QueuedWork>,
    owner: ThreadId,
    stats: RoundStats,
}

impl<E: ScriptEngine> std::fmt::Debug for SetScriptManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetScriptManager")
            .field("game", &self.set.game().name)
            .field("cards", &self.set.cards().len())
            .field("contexts", &self.contexts.len())
            .field("delay", &self.delay)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SetScriptManager<ExprEngine> {
    /// Manage a set with the bundled expression engine.
    #[must_use]
    pub fn with_expr_engine(set: Set) -> Self {
        Self::new(set, ExprEngine::new())
    }
}

impl<E: ScriptEngine> SetScriptManager<E> {
    /// Manage a set with the default configuration.
    #[must_use]
    pub fn new(set: Set, engine: E) -> Self {
        Self::with_config(set, engine, EngineConfig::default())
    }

    /// Manage a set.
    #[must_use]
    pub fn with_config(set: Set, engine: E, config: EngineConfig) -> Self {
        let log = ChangeLog::new(config.history_limit);
        Self {
            set,
            engine,
            config,
            contexts: ContextCache::new(),
            clock: AgeClock::new(),
            errors: ErrorReporter::new(),
            log,
            delay: Delay::empty(),
            draining: false,
            queued: VecDeque::new(),
            owner: std::thread::current().id(),
            stats: RoundStats::default(),
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn set(&self) -> &Set {
        &self.set
    }

    /// The set, for changes the host reports through
    /// [`handle_event`](Self::handle_event) itself.
    pub fn set_mut(&mut self) -> &mut Set {
        &mut self.set
    }

    /// Give the set back.
    #[must_use]
    pub fn into_set(self) -> Set {
        self.set
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> RoundStats {
        self.stats
    }

    #[must_use]
    pub fn change_log(&self) -> &ChangeLog {
        &self.log
    }

    /// Reported script errors, not yet taken.
    #[must_use]
    pub fn errors(&self) -> &ErrorReporter {
        &self.errors
    }

    /// Take every reported error.
    pub fn take_errors(&mut self) -> Vec<ReportedError> {
        self.errors.take()
    }

    /// Check if deferred work is pending.
    #[must_use]
    pub fn has_deferred(&self) -> bool {
        !self.delay.is_empty()
    }

    #[must_use]
    pub fn contexts(&self) -> &ContextCache {
        &self.contexts
    }

    /// The shared context of a stylesheet.
    pub fn context_for_stylesheet(
        &mut self,
        stylesheet: StyleSheetId,
    ) -> Result<&mut Context, StructuralError> {
        self.assert_owner();
        self.contexts.context_for_stylesheet(
            &self.engine,
            &self.config,
            &mut self.set,
            &mut self.errors,
            stylesheet,
        )
    }

    /// The shared context of a card's stylesheet, bound to the card.
    pub fn context_for_card(&mut self, card: Option<CardId>) -> Result<&mut Context, StructuralError> {
        self.assert_owner();
        self.contexts
            .context_for_card(&self.engine, &self.config, &mut self.set, &mut self.errors, card)
    }

    /// Drop the context of a stylesheet, e.g. after its init script changed.
    pub fn invalidate_context(&mut self, stylesheet: StyleSheetId) -> bool {
        self.contexts.invalidate(stylesheet)
    }

    pub fn invalidate_all_contexts(&mut self) {
        self.contexts.clear();
    }

    /// Register a change listener. It is held weakly.
    pub fn add_change_listener(&mut self, listener: &Rc<dyn ChangeListener>) {
        self.log.add_listener(listener);
    }

    pub fn remove_change_listener(&mut self, listener: &Rc<dyn ChangeListener>) {
        self.log.remove_listener(listener);
    }

    /// Register a listener on one style. It is held weakly.
    pub fn add_style_listener(
        &mut self,
        stylesheet: StyleSheetId,
        field: FieldIndex,
        extra: bool,
        listener: &Rc<dyn StyleListener>,
    ) -> Result<(), StructuralError> {
        self.set
            .stylesheet_mut(stylesheet)?
            .style_mut(field, extra)
            .ok_or_else(|| StructuralError::MissingValue(format!("style {field} of {stylesheet}")))?
            .add_listener(listener);
        Ok(())
    }

    // === Events ===

    /// Propagate a change that was already applied to the set.
    ///
    /// While a round is draining the event is queued instead. Script errors
    /// are reported, structural errors are returned.
    pub fn handle_event(&mut self, event: SetEvent) -> Result<(), StructuralError> {
        self.assert_owner();
        self.queued.push_back(QueuedWork::Event(event));
        if self.draining {
            return Ok(());
        }
        self.run_queue()
    }

    /// Recompute everything: set values, card values, card list dependents
    /// and the styles of every card.
    pub fn update_all(&mut self) -> Result<(), StructuralError> {
        self.assert_owner();
        log::debug!("update all");
        self.draining = true;
        let result = self.update_all_values();
        self.draining = false;
        result?;
        self.run_queue()
    }

    /// Recompute the styles of a card. In content-dependent-only mode, only
    /// styles that read rendered content are updated and listeners are told
    /// the change is `ALREADY_PREPARED`.
    pub fn update_styles(&mut self, card: CardId, only_content_dependent: bool) -> Result<(), StructuralError> {
        self.assert_owner();
        self.draining = true;
        let result = self.update_card_styles(card, only_content_dependent);
        self.draining = false;
        result?;
        self.run_queue()
    }

    /// Run work postponed by keyword edits: rebuild the keyword database
    /// once and recompute keyword dependents.
    pub fn flush_deferred(&mut self) -> Result<(), StructuralError> {
        self.assert_owner();
        let delay = std::mem::take(&mut self.delay);
        if delay.contains(Delay::KEYWORDS) {
            self.set.refresh_keyword_db();
            self.draining = true;
            let result = self.update_all_dependents(DependentList::Keywords, None);
            self.draining = false;
            result?;
        }
        self.run_queue()
    }

    fn run_queue(&mut self) -> Result<(), StructuralError> {
        let mut processed = 0;
        while let Some(work) = self.queued.pop_front() {
            if processed == self.config.chain_limit {
                log::warn!(
                    "dropping {} queued update(s) after {processed}",
                    self.queued.len() + 1
                );
                self.queued.clear();
                break;
            }
            processed += 1;
            self.draining = true;
            let result = match work {
                QueuedWork::Event(event) => self.dispatch(event),
                QueuedWork::Action(action) => self.perform(action),
            };
            self.draining = false;
            if let Err(error) = result {
                self.queued.clear();
                return Err(error);
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, event: SetEvent) -> Result<(), StructuralError> {
        if self.config.log_updates {
            log::debug!("{event}");
        }
        match event {
            SetEvent::ValueEdited {
                value: ValueRef::Keyword(keyword, slot),
            }
            | SetEvent::KeywordTextEdited { keyword, slot } => self.keyword_text_edited(keyword, slot),
            SetEvent::ValueEdited { value } => self.update_value(value),
            SetEvent::CardsAdded { cards } => {
                for card in cards {
                    let fields: Vec<FieldIndex> = self.set.card(card)?.data.indices().collect();
                    for field in fields {
                        self.recompute(ValueRef::Card(card, field))?;
                    }
                }
                self.update_all_dependents(DependentList::Cards, None)
            }
            SetEvent::CardsRemoved { .. } | SetEvent::CardsReordered => {
                self.update_all_dependents(DependentList::Cards, None)
            }
            SetEvent::KeywordListChanged | SetEvent::KeywordModeChanged { .. } => {
                self.set.refresh_keyword_db();
                self.update_all_dependents(DependentList::Keywords, None)
            }
            SetEvent::CardStyleSheetChanged { card } => {
                self.update_all_dependents(DependentList::StyleSheet, Some(card))
            }
            SetEvent::SetStyleSheetChanged => {
                self.update_all_dependents(DependentList::StyleSheet, None)
            }
        }
    }

    fn perform(&mut self, action: ScriptAction) -> Result<(), StructuralError> {
        match action {
            ScriptAction::SetValue { value, content } => {
                if self.apply_content(value, content)? {
                    self.dispatch(SetEvent::ValueEdited { value })?;
                }
                Ok(())
            }
        }
    }

    // === Rounds ===

    /// Recompute an edited value, then everything depending on it.
    fn update_value(&mut self, loc: ValueRef) -> Result<(), StructuralError> {
        let start = self.clock.tick();
        self.recompute(loc)?;
        let dependents = self.set.field_for(loc)?.dependent_scripts().clone();
        let mut to_update = VecDeque::new();
        self.also_update(&mut to_update, dependents.as_slice(), loc.card())?;
        self.update_recursive(to_update, start)
    }

    fn update_all_dependents(&mut self, list: DependentList, card: Option<CardId>) -> Result<(), StructuralError> {
        // Contexts trigger discovery; make sure the lists are complete.
        let stylesheet = self.set.stylesheet_for(card)?;
        self.context_for_stylesheet(stylesheet)?;

        let start = self.clock.tick();
        let dependents = self.set.game().dependents(list).clone();
        let mut to_update = VecDeque::new();
        self.also_update(&mut to_update, dependents.as_slice(), card)?;
        self.update_recursive(to_update, start)
    }

    fn update_recursive(&mut self, mut to_update: VecDeque<ValueRef>, start: Age) -> Result<(), StructuralError> {
        if to_update.is_empty() {
            return Ok(());
        }
        self.set.clear_order_cache();
        self.stats.rounds += 1;
        while let Some(loc) = to_update.pop_front() {
            self.update_to_update(loc, &mut to_update, start)?;
        }
        Ok(())
    }

    fn update_to_update(
        &mut self,
        loc: ValueRef,
        to_update: &mut VecDeque<ValueRef>,
        start: Age,
    ) -> Result<(), StructuralError> {
        if self.set.value(loc)?.age() >= start {
            self.stats.skipped += 1;
            return Ok(());
        }
        let changed = self.recompute(loc)?;
        if self.config.log_updates {
            log::debug!("{}: {loc}", if changed { "changed" } else { "same" });
        }
        if changed {
            self.log.tell(ChangeNotice::Value {
                value: loc,
                card: loc.card(),
            });
            let dependents = self.set.field_for(loc)?.dependent_scripts().clone();
            self.also_update(to_update, dependents.as_slice(), loc.card())?;
        }
        Ok(())
    }

    /// Append the items named by dependency records to the worklist.
    fn also_update(
        &mut self,
        to_update: &mut VecDeque<ValueRef>,
        dependents: &[Dependency],
        card: Option<CardId>,
    ) -> Result<(), StructuralError> {
        let mut visited = FxHashSet::default();
        self.also_update_from(to_update, dependents, card, &mut visited)
    }

    fn also_update_from(
        &mut self,
        to_update: &mut VecDeque<ValueRef>,
        dependents: &[Dependency],
        card: Option<CardId>,
        visited: &mut FxHashSet<Dependency>,
    ) -> Result<(), StructuralError> {
        for dependency in dependents {
            let index = dependency.index;
            match (dependency.kind, card) {
                (DependencyKind::SetField, _) => to_update.push_back(ValueRef::Set(index)),
                (DependencyKind::CardField, Some(card)) => {
                    to_update.push_back(ValueRef::Card(card, index));
                }
                // Without a card every card is affected.
                (DependencyKind::CardField | DependencyKind::CardsField, _) => {
                    to_update.extend(self.set.cards().iter().map(|c| ValueRef::Card(c.id(), index)));
                }
                (DependencyKind::CardStyle, _) => {
                    let Some(stylesheet) = dependency.stylesheet else {
                        continue;
                    };
                    if let Some(style) = self.set.stylesheet_mut(stylesheet)?.style_mut(index, false) {
                        style.invalidate();
                        self.log.tell(ChangeNotice::Style {
                            stylesheet,
                            field: index,
                            extra: false,
                            changes: ChangeMask::OTHER,
                        });
                    }
                }
                // Extra card values are refreshed by the style pass.
                (DependencyKind::ExtraCardField, _) => {}
                (DependencyKind::CardCopyDep | DependencyKind::SetCopyDep, _) => {
                    if !visited.insert(*dependency) {
                        continue;
                    }
                    let fields = if dependency.kind == DependencyKind::CardCopyDep {
                        self.set.game().card_fields()
                    } else {
                        self.set.game().set_fields()
                    };
                    let forwarded = match fields.get(index) {
                        Some(field) => field.dependent_scripts().clone(),
                        None => continue,
                    };
                    self.also_update_from(to_update, forwarded.as_slice(), card, visited)?;
                }
            }
        }
        Ok(())
    }

    /// Recompute one value. Script errors are reported and count as no
    /// change; the value keeps its content and age.
    fn recompute(&mut self, loc: ValueRef) -> Result<bool, StructuralError> {
        let age = self.clock.tick();
        self.stats.evaluated += 1;
        let ctx = self.contexts.context_for_card(
            &self.engine,
            &self.config,
            &mut self.set,
            &mut self.errors,
            loc.card(),
        )?;
        let result = self.set.update_value(&self.engine, ctx, loc, age);
        let requests = ctx.take_requests();
        self.queued.extend(requests.into_iter().map(QueuedWork::Action));
        match result {
            Ok(changed) => {
                self.stats.changed += u64::from(changed);
                Ok(changed)
            }
            Err(EngineError::Script(error)) => {
                let description = self.describe(loc)?;
                self.errors.report_script(error, format!("while updating {description}"));
                Ok(false)
            }
            Err(EngineError::Structural(error)) => Err(error),
        }
    }

    fn describe(&self, loc: ValueRef) -> Result<String, StructuralError> {
        let scope = match loc {
            ValueRef::Set(_) => "set value",
            ValueRef::Card(..) => "card value",
            ValueRef::Styling { .. } => "styling value",
            ValueRef::ExtraCard { .. } => "extra card value",
            ValueRef::Keyword(..) => "keyword value",
        };
        Ok(format!("{scope} '{}'", self.set.field_for(loc)?.name))
    }

    fn update_all_values(&mut self) -> Result<(), StructuralError> {
        let set_fields: Vec<FieldIndex> = self.set.data().indices().collect();
        for field in set_fields {
            self.recompute_and_tell(ValueRef::Set(field))?;
        }
        for card in self.set.card_ids() {
            let fields: Vec<FieldIndex> = self.set.card(card)?.data.indices().collect();
            for field in fields {
                self.recompute_and_tell(ValueRef::Card(card, field))?;
            }
        }
        self.update_all_dependents(DependentList::Cards, None)?;
        for card in self.set.card_ids() {
            self.update_card_styles(card, false)?;
        }
        Ok(())
    }

    fn recompute_and_tell(&mut self, loc: ValueRef) -> Result<bool, StructuralError> {
        let changed = self.recompute(loc)?;
        if changed {
            self.log.tell(ChangeNotice::Value {
                value: loc,
                card: loc.card(),
            });
        }
        Ok(changed)
    }

    fn update_card_styles(&mut self, card: CardId, only_content_dependent: bool) -> Result<(), StructuralError> {
        let stylesheet = self.set.stylesheet_for(Some(card))?;
        self.context_for_card(Some(card))?;

        if !only_content_dependent {
            let extra: Vec<FieldIndex> = self.set.stylesheet(stylesheet)?.extra_card_fields().indices().collect();
            for field in extra {
                self.recompute_and_tell(ValueRef::ExtraCard {
                    card,
                    stylesheet,
                    field,
                })?;
            }
        }

        for extra in [false, true] {
            let sheet = self.set.stylesheet(stylesheet)?;
            let styles = if extra {
                sheet.extra_card_style()
            } else {
                sheet.card_style()
            };
            let fields: Vec<FieldIndex> = styles
                .iter()
                .filter(|style| !only_content_dependent || style.content_dependent())
                .map(|style| style.field())
                .collect();
            for field in fields {
                self.update_style(card, stylesheet, field, extra, only_content_dependent)?;
            }
        }
        Ok(())
    }

    fn update_style(
        &mut self,
        card: CardId,
        stylesheet: StyleSheetId,
        field: FieldIndex,
        extra: bool,
        only_content_dependent: bool,
    ) -> Result<(), StructuralError> {
        let missing = || StructuralError::MissingValue(format!("style {field} of {stylesheet}"));
        let ctx = self.contexts.context_for_card(
            &self.engine,
            &self.config,
            &mut self.set,
            &mut self.errors,
            Some(card),
        )?;
        let update = self
            .set
            .stylesheet(stylesheet)?
            .style(field, extra)
            .ok_or_else(missing)?
            .evaluate(&self.engine, ctx, &self.set);
        let requests = ctx.take_requests();
        self.queued.extend(requests.into_iter().map(QueuedWork::Action));

        match update {
            Ok(update) => {
                let style = self
                    .set
                    .stylesheet_mut(stylesheet)?
                    .style_mut(field, extra)
                    .ok_or_else(missing)?;
                let mut changes = style.apply(update, &self.config.geometry);
                if changes.is_empty() {
                    return Ok(());
                }
                if only_content_dependent {
                    changes |= ChangeMask::ALREADY_PREPARED;
                }
                style.tell_listeners(changes);
                self.log.tell(ChangeNotice::Style {
                    stylesheet,
                    field,
                    extra,
                    changes,
                });
            }
            Err(error) => {
                let sheet = self.set.stylesheet(stylesheet)?;
                let fields = if extra {
                    sheet.extra_card_fields()
                } else {
                    self.set.game().card_fields()
                };
                let name = fields.get(field).ok_or_else(missing)?.name.clone();
                self.errors
                    .report_script(error, format!("while updating styles for '{name}'"));
            }
        }
        Ok(())
    }

    fn keyword_text_edited(&mut self, keyword: KeywordId, slot: KeywordSlot) -> Result<(), StructuralError> {
        if slot == KeywordSlot::Match {
            self.recompute(ValueRef::Keyword(keyword, slot))?;
            self.set.keyword_mut(keyword)?.prepare();
            self.set.clear_keyword_db();
        }
        self.delay |= Delay::KEYWORDS;
        Ok(())
    }

    // === Mutations ===

    /// Store new content as a user edit. Returns false, and propagates
    /// nothing, if the content did not change.
    fn apply_content(&mut self, loc: ValueRef, content: ScriptValue) -> Result<bool, StructuralError> {
        if let ValueRef::Keyword(keyword, slot) = loc {
            let keyword = self.set.keyword_mut(keyword)?;
            if !keyword.value_mut(slot).set_content(content) {
                return Ok(false);
            }
            return Ok(keyword.store(slot));
        }
        Ok(self.set.value_mut(loc)?.set_content(content))
    }

    /// Edit a value and propagate. Returns whether the content changed.
    pub fn set_value(&mut self, loc: ValueRef, content: impl Into<ScriptValue>) -> Result<bool, StructuralError> {
        self.assert_owner();
        let changed = self.apply_content(loc, content.into())?;
        if changed {
            self.handle_event(SetEvent::ValueEdited { value: loc })?;
        }
        Ok(changed)
    }

    /// Edit a text slot of a keyword. Propagation is deferred until
    /// [`flush_deferred`](Self::flush_deferred).
    pub fn edit_keyword_text(
        &mut self,
        keyword: KeywordId,
        slot: KeywordSlot,
        text: impl Into<String>,
    ) -> Result<(), StructuralError> {
        self.assert_owner();
        self.set.keyword_mut(keyword)?.set_text(slot, text);
        self.handle_event(SetEvent::KeywordTextEdited { keyword, slot })
    }

    /// A fresh card, not yet part of the set.
    pub fn new_card(&mut self) -> Card {
        self.set.new_card()
    }

    /// Add one card and propagate.
    pub fn add_card(&mut self, card: Card) -> Result<CardId, StructuralError> {
        let id = card.id();
        self.add_cards(vec![card])?;
        Ok(id)
    }

    /// Add cards and propagate. The batch is checked first; on error the
    /// set is unchanged.
    pub fn add_cards(&mut self, cards: Vec<Card>) -> Result<Vec<CardId>, StructuralError> {
        self.assert_owner();
        let mut seen = FxHashSet::default();
        for card in &cards {
            let id = card.id();
            if self.set.card(id).is_ok() || !seen.insert(id) {
                return Err(StructuralError::DuplicateCard(id));
            }
            if let Some(stylesheet) = card.stylesheet {
                self.set.stylesheet(stylesheet)?;
            }
        }
        let ids = cards
            .into_iter()
            .map(|card| self.set.insert_card(card))
            .collect::<Result<Vec<_>, _>>()?;
        self.handle_event(SetEvent::CardsAdded { cards: ids.clone() })?;
        Ok(ids)
    }

    /// Remove cards and propagate. The batch is checked first; on error the
    /// set is unchanged.
    pub fn remove_cards(&mut self, cards: &[CardId]) -> Result<Vec<Card>, StructuralError> {
        self.assert_owner();
        let mut seen = FxHashSet::default();
        for &id in cards {
            self.set.card(id)?;
            if !seen.insert(id) {
                return Err(StructuralError::DuplicateCard(id));
            }
        }
        let removed = cards
            .iter()
            .map(|&id| self.set.remove_card(id))
            .collect::<Result<Vec<_>, _>>()?;
        self.handle_event(SetEvent::CardsRemoved {
            cards: cards.to_vec(),
        })?;
        Ok(removed)
    }

    /// Reorder the cards and propagate.
    pub fn reorder_cards(&mut self, order: &[CardId]) -> Result<(), StructuralError> {
        self.assert_owner();
        self.set.reorder_cards(order)?;
        self.handle_event(SetEvent::CardsReordered)
    }

    /// Add a keyword and propagate.
    pub fn add_keyword(&mut self, mut keyword: Keyword) -> Result<KeywordId, StructuralError> {
        self.assert_owner();
        keyword.prepare();
        let id = self.set.add_keyword(keyword);
        self.handle_event(SetEvent::KeywordListChanged)?;
        Ok(id)
    }

    /// Remove a keyword and propagate.
    pub fn remove_keyword(&mut self, keyword: KeywordId) -> Result<Keyword, StructuralError> {
        self.assert_owner();
        let removed = self.set.remove_keyword(keyword)?;
        self.handle_event(SetEvent::KeywordListChanged)?;
        Ok(removed)
    }

    /// Change a keyword's mode and propagate.
    pub fn set_keyword_mode(&mut self, keyword: KeywordId, mode: impl Into<String>) -> Result<(), StructuralError> {
        self.assert_owner();
        self.set.keyword_mut(keyword)?.mode = mode.into();
        self.handle_event(SetEvent::KeywordModeChanged { keyword })
    }

    /// Give a card its own stylesheet (`None` follows the set) and propagate.
    pub fn set_card_stylesheet(
        &mut self,
        card: CardId,
        stylesheet: Option<StyleSheetId>,
    ) -> Result<(), StructuralError> {
        self.assert_owner();
        if let Some(stylesheet) = stylesheet {
            self.set.stylesheet(stylesheet)?;
        }
        self.set.card_mut(card)?.stylesheet = stylesheet;
        let effective = self.set.stylesheet_for(Some(card))?;
        self.set.ensure_extra_data(card, effective)?;
        self.handle_event(SetEvent::CardStyleSheetChanged { card })
    }

    /// Switch the set's stylesheet and propagate.
    pub fn set_stylesheet(&mut self, stylesheet: StyleSheetId) -> Result<(), StructuralError> {
        self.assert_owner();
        self.set.set_stylesheet_id(stylesheet)?;
        self.handle_event(SetEvent::SetStyleSheetChanged)
    }

    /// Store content metrics reported by a renderer. If they changed, the
    /// content-dependent styles of every card on that stylesheet are
    /// updated. Returns whether they changed.
    pub fn set_content_layout(
        &mut self,
        stylesheet: StyleSheetId,
        field: FieldIndex,
        extra: bool,
        layout: ContentLayout,
    ) -> Result<bool, StructuralError> {
        self.assert_owner();
        let changed = self
            .set
            .stylesheet_mut(stylesheet)?
            .style_mut(field, extra)
            .ok_or_else(|| StructuralError::MissingValue(format!("style {field} of {stylesheet}")))?
            .set_content(layout);
        if !changed {
            return Ok(false);
        }
        let mut cards = Vec::new();
        for card in self.set.cards() {
            if self.set.stylesheet_for(Some(card.id()))? == stylesheet {
                cards.push(card.id());
            }
        }
        for card in cards {
            self.update_styles(card, true)?;
        }
        Ok(true)
    }

    fn assert_owner(&self) {
        debug_assert_eq!(
            std::thread::current().id(),
            self.owner,
            "SetScriptManager used from a thread other than its owner"
        );
    }
}
