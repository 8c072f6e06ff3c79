//! Styles: how a field is laid out on a card.
//!
//! Every style parameter is a [`Scriptable`]. The style pass evaluates all
//! scripts first ([`Style::evaluate`], read-only against the set), then
//! stores the results and resolves the box geometry ([`Style::apply`]).
//! The split lets the manager evaluate with a shared borrow of the set and
//! apply with a mutable one.
//!
//! ## Listeners
//!
//! Renderers register [`StyleListener`]s. Styles hold them weakly, so a
//! dropped viewer silently stops receiving notifications.

use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::core::{ChangeMask, FieldIndex, GeometryConfig, ScriptError};
use crate::geometry::{AutomaticSide, GeometryResolver};
use crate::script::{Context, ScriptEngine, ScriptValue, Scriptable, VariableReads};

use super::set::Set;

/// Receives change notifications of a style.
pub trait StyleListener {
    /// The style changed in the given categories.
    fn on_style_change(&self, changes: ChangeMask);
}

/// Weakly held listeners.
#[derive(Clone, Default)]
pub struct StyleListeners {
    listeners: Vec<Weak<dyn StyleListener>>,
}

impl std::fmt::Debug for StyleListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StyleListeners({})", self.listeners.len())
    }
}

impl StyleListeners {
    fn add(&mut self, listener: &Rc<dyn StyleListener>) {
        self.listeners.push(Rc::downgrade(listener));
    }

    fn remove(&mut self, listener: &Rc<dyn StyleListener>) {
        let target = Rc::downgrade(listener);
        self.listeners.retain(|l| !l.ptr_eq(&target));
    }

    fn tell(&mut self, changes: ChangeMask) {
        self.listeners.retain(|l| match l.upgrade() {
            Some(listener) => {
                listener.on_style_change(changes);
                true
            }
            None => false,
        });
    }

    fn live(&self) -> usize {
        self.listeners.iter().filter(|l| l.strong_count() > 0).count()
    }
}

/// Content metrics reported by a renderer after laying out a value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentLayout {
    pub width: f64,
    pub height: f64,
    pub lines: u32,
}

/// Extra parameters of text styles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub alignment: Scriptable<String>,
    pub padding_left: Scriptable<f64>,
    pub padding_right: Scriptable<f64>,
    pub padding_top: Scriptable<f64>,
    pub padding_bottom: Scriptable<f64>,
}

impl TextStyle {
    fn paddings(&self) -> [&Scriptable<f64>; 4] {
        [
            &self.padding_left,
            &self.padding_right,
            &self.padding_top,
            &self.padding_bottom,
        ]
    }

    fn paddings_mut(&mut self) -> [&mut Scriptable<f64>; 4] {
        [
            &mut self.padding_left,
            &mut self.padding_right,
            &mut self.padding_top,
            &mut self.padding_bottom,
        ]
    }
}

/// A box descriptor of a style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Descriptor {
    Left,
    Width,
    Right,
    Top,
    Height,
    Bottom,
    Angle,
}

impl Descriptor {
    /// All descriptors.
    pub const ALL: [Descriptor; 7] = [
        Descriptor::Left,
        Descriptor::Width,
        Descriptor::Right,
        Descriptor::Top,
        Descriptor::Height,
        Descriptor::Bottom,
        Descriptor::Angle,
    ];

    /// Member name scripts use.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Descriptor::Left => "left",
            Descriptor::Width => "width",
            Descriptor::Right => "right",
            Descriptor::Top => "top",
            Descriptor::Height => "height",
            Descriptor::Bottom => "bottom",
            Descriptor::Angle => "angle",
        }
    }
}

/// Script results for one style, not yet stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleUpdate {
    descriptors: [Option<f64>; 7],
    visible: Option<bool>,
    mask: Option<String>,
    alignment: Option<String>,
    padding: [Option<f64>; 4],
}

/// Layout of one field.
#[derive(Clone, Debug)]
pub struct Style {
    field: FieldIndex,
    pub z_index: i32,
    pub left: Scriptable<f64>,
    pub width: Scriptable<f64>,
    pub right: Scriptable<f64>,
    pub top: Scriptable<f64>,
    pub height: Scriptable<f64>,
    pub bottom: Scriptable<f64>,
    pub angle: Scriptable<f64>,
    pub visible: Scriptable<bool>,
    pub mask: Scriptable<String>,
    pub text: Option<TextStyle>,
    pub automatic_side: AutomaticSide,
    content_dependent: Option<bool>,
    content: ContentLayout,
    needs_refresh: bool,
    listeners: StyleListeners,
}

impl Style {
    /// A style with every position unset and zero size.
    #[must_use]
    pub fn new(field: FieldIndex, config: &GeometryConfig) -> Self {
        let unset = config.unset_default;
        Self {
            field,
            z_index: 0,
            left: Scriptable::new(unset),
            width: Scriptable::new(0.0),
            right: Scriptable::new(unset),
            top: Scriptable::new(unset),
            height: Scriptable::new(0.0),
            bottom: Scriptable::new(unset),
            angle: Scriptable::new(0.0),
            visible: Scriptable::new(true),
            mask: Scriptable::new(String::new()),
            text: None,
            automatic_side: AutomaticSide::empty(),
            content_dependent: None,
            content: ContentLayout::default(),
            needs_refresh: false,
            listeners: StyleListeners::default(),
        }
    }

    /// Place the top-left corner.
    #[must_use]
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left.set(left);
        self.top.set(top);
        self
    }

    /// Set width and height.
    #[must_use]
    pub fn sized(mut self, width: f64, height: f64) -> Self {
        self.width.set(width);
        self.height.set(height);
        self
    }

    /// Set one descriptor to a constant.
    #[must_use]
    pub fn with(mut self, descriptor: Descriptor, value: f64) -> Self {
        *self.descriptor_mut(descriptor) = Scriptable::new(value);
        self
    }

    /// Compute one descriptor with a script.
    #[must_use]
    pub fn scripted(mut self, descriptor: Descriptor, script: impl Into<crate::script::Script>) -> Self {
        let initial = *self.descriptor(descriptor).get();
        *self.descriptor_mut(descriptor) = Scriptable::scripted(script, initial);
        self
    }

    /// Compute visibility with a script.
    #[must_use]
    pub fn with_visible(mut self, visible: Scriptable<bool>) -> Self {
        self.visible = visible;
        self
    }

    /// Compute the mask with a script.
    #[must_use]
    pub fn with_mask(mut self, mask: Scriptable<String>) -> Self {
        self.mask = mask;
        self
    }

    /// Add text parameters.
    #[must_use]
    pub fn with_text(mut self, text: TextStyle) -> Self {
        self.text = Some(text);
        self
    }

    /// Set the stacking order.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// The field this style lays out.
    #[must_use]
    pub fn field(&self) -> FieldIndex {
        self.field
    }

    /// A box descriptor.
    #[must_use]
    pub fn descriptor(&self, descriptor: Descriptor) -> &Scriptable<f64> {
        match descriptor {
            Descriptor::Left => &self.left,
            Descriptor::Width => &self.width,
            Descriptor::Right => &self.right,
            Descriptor::Top => &self.top,
            Descriptor::Height => &self.height,
            Descriptor::Bottom => &self.bottom,
            Descriptor::Angle => &self.angle,
        }
    }

    /// A box descriptor, mutably.
    pub fn descriptor_mut(&mut self, descriptor: Descriptor) -> &mut Scriptable<f64> {
        match descriptor {
            Descriptor::Left => &mut self.left,
            Descriptor::Width => &mut self.width,
            Descriptor::Right => &mut self.right,
            Descriptor::Top => &mut self.top,
            Descriptor::Height => &mut self.height,
            Descriptor::Bottom => &mut self.bottom,
            Descriptor::Angle => &mut self.angle,
        }
    }

    /// Whether any parameter reads rendered content. `false` until the
    /// content check ran.
    #[must_use]
    pub fn content_dependent(&self) -> bool {
        self.content_dependent.unwrap_or(false)
    }

    /// Check if the content check already ran.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        self.content_dependent.is_some()
    }

    /// Record the content check result. Later calls are ignored.
    pub(crate) fn classify(&mut self, content_dependent: bool) {
        if self.content_dependent.is_none() {
            self.content_dependent = Some(content_dependent);
        }
    }

    /// Everything the style's scripts can read.
    pub fn script_reads<E: ScriptEngine + ?Sized>(&self, engine: &E) -> VariableReads {
        let mut reads = VariableReads::new();
        for descriptor in Descriptor::ALL {
            reads.extend(self.descriptor(descriptor).reads(engine));
        }
        reads.extend(self.visible.reads(engine));
        reads.extend(self.mask.reads(engine));
        if let Some(text) = &self.text {
            reads.extend(text.alignment.reads(engine));
            for padding in text.paddings() {
                reads.extend(padding.reads(engine));
            }
        }
        reads.clear_forward();
        reads
    }

    /// The last content metrics reported by a renderer.
    #[must_use]
    pub fn content(&self) -> &ContentLayout {
        &self.content
    }

    /// Store content metrics. Returns whether they changed.
    pub fn set_content(&mut self, content: ContentLayout) -> bool {
        if self.content == content {
            false
        } else {
            self.content = content;
            true
        }
    }

    /// Mark generated output as stale.
    pub fn invalidate(&mut self) {
        self.needs_refresh = true;
    }

    /// Check if generated output is stale.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh
    }

    /// Check if the box has enough descriptors set on both axes.
    #[must_use]
    pub fn has_size(&self, config: &GeometryConfig) -> bool {
        let h = [
            GeometryResolver::is_set(&self.left, config),
            GeometryResolver::is_size_set(&self.width, config),
            GeometryResolver::is_set(&self.right, config),
        ];
        let v = [
            GeometryResolver::is_set(&self.top, config),
            GeometryResolver::is_size_set(&self.height, config),
            GeometryResolver::is_set(&self.bottom, config),
        ];
        let count = |axis: [bool; 3]| axis.iter().filter(|&&b| b).count();
        count(h) >= 2 && count(v) >= 2
    }

    /// Run every script. Nothing is stored.
    pub fn evaluate<E: ScriptEngine + ?Sized>(
        &self,
        engine: &E,
        ctx: &mut Context,
        set: &Set,
    ) -> Result<StyleUpdate, ScriptError> {
        let mut update = StyleUpdate::default();
        for (slot, descriptor) in update.descriptors.iter_mut().zip(Descriptor::ALL) {
            *slot = self.descriptor(descriptor).evaluate(engine, ctx, set)?;
        }
        update.visible = self.visible.evaluate(engine, ctx, set)?;
        update.mask = self.mask.evaluate(engine, ctx, set)?;
        if let Some(text) = &self.text {
            update.alignment = text.alignment.evaluate(engine, ctx, set)?;
            for (slot, padding) in update.padding.iter_mut().zip(text.paddings()) {
                *slot = padding.evaluate(engine, ctx, set)?;
            }
        }
        Ok(update)
    }

    /// Store script results and resolve the geometry. Returns the change
    /// categories; empty means nothing changed.
    pub fn apply(&mut self, update: StyleUpdate, config: &GeometryConfig) -> ChangeMask {
        let mut size = false;
        for (value, descriptor) in update.descriptors.into_iter().zip(Descriptor::ALL) {
            if let Some(value) = value {
                size |= self.descriptor_mut(descriptor).assign(value);
            }
        }
        let visible = update.visible.is_some_and(|v| self.visible.assign(v));
        let mask = update.mask.is_some_and(|m| self.mask.assign(m));

        let mut other = false;
        if let Some(text) = &mut self.text {
            if let Some(alignment) = update.alignment {
                other |= text.alignment.assign(alignment);
            }
            for (value, padding) in update.padding.into_iter().zip(text.paddings_mut()) {
                if let Some(value) = value {
                    other |= padding.assign(value);
                }
            }
        }
        other |= std::mem::take(&mut self.needs_refresh);

        let changes = ChangeMask::when(size, ChangeMask::SIZE)
            | ChangeMask::when(visible, ChangeMask::VISIBILITY)
            | ChangeMask::when(mask, ChangeMask::MASK)
            | ChangeMask::when(other, ChangeMask::OTHER);
        GeometryResolver::resolve(self, changes, config)
    }

    /// A member as scripts see it.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<ScriptValue> {
        if let Some(descriptor) = Descriptor::ALL.into_iter().find(|d| d.name() == name) {
            return Some(ScriptValue::Double(*self.descriptor(descriptor).get()));
        }
        match name {
            "z_index" => Some(ScriptValue::Int(i64::from(self.z_index))),
            "visible" => Some(ScriptValue::Bool(*self.visible.get())),
            "mask" => Some(ScriptValue::Text(self.mask.get().clone())),
            "alignment" => self
                .text
                .as_ref()
                .map(|text| ScriptValue::Text(text.alignment.get().clone())),
            "content_width" => Some(ScriptValue::Double(self.content.width)),
            "content_height" => Some(ScriptValue::Double(self.content.height)),
            "content_lines" => Some(ScriptValue::Int(i64::from(self.content.lines))),
            _ => None,
        }
    }

    /// Register a listener. It is held weakly.
    pub fn add_listener(&mut self, listener: &Rc<dyn StyleListener>) {
        self.listeners.add(listener);
    }

    /// Unregister a listener.
    pub fn remove_listener(&mut self, listener: &Rc<dyn StyleListener>) {
        self.listeners.remove(listener);
    }

    /// Notify live listeners; dead ones are dropped.
    pub fn tell_listeners(&mut self, changes: ChangeMask) {
        self.listeners.tell(changes);
    }

    /// Number of live listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Recorder {
        seen: Cell<u8>,
    }

    impl StyleListener for Recorder {
        fn on_style_change(&self, changes: ChangeMask) {
            self.seen.set(self.seen.get() | changes.bits());
        }
    }

    fn style() -> Style {
        Style::new(FieldIndex(0), &GeometryConfig::default())
    }

    #[test]
    fn test_new_is_unset() {
        let config = GeometryConfig::default();
        let s = style();
        assert_eq!(*s.left.get(), config.unset_default);
        assert_eq!(*s.width.get(), 0.0);
        assert!(*s.visible.get());
        assert!(!s.has_size(&config));
        assert!(s.at(0.0, 0.0).sized(10.0, 10.0).has_size(&config));
    }

    #[test]
    fn test_classify_once() {
        let mut s = style();
        assert!(!s.is_classified());
        s.classify(true);
        s.classify(false);
        assert!(s.content_dependent());
    }

    #[test]
    fn test_apply_visibility_change() {
        let config = GeometryConfig::default();
        let mut s = style().at(0.0, 0.0).sized(10.0, 10.0);
        s.apply(StyleUpdate::default(), &config);

        let update = StyleUpdate {
            visible: Some(false),
            ..StyleUpdate::default()
        };
        assert_eq!(s.apply(update, &config), ChangeMask::VISIBILITY);
        assert_eq!(s.apply(StyleUpdate::default(), &config), ChangeMask::NONE);
    }

    #[test]
    fn test_invalidate_reports_other_once() {
        let config = GeometryConfig::default();
        let mut s = style().at(0.0, 0.0).sized(10.0, 10.0);
        s.apply(StyleUpdate::default(), &config);

        s.invalidate();
        assert!(s.needs_refresh());
        assert_eq!(s.apply(StyleUpdate::default(), &config), ChangeMask::OTHER);
        assert!(!s.needs_refresh());
    }

    #[test]
    fn test_members() {
        let mut s = style().at(5.0, 6.0);
        s.set_content(ContentLayout {
            width: 10.0,
            height: 20.0,
            lines: 2,
        });
        assert_eq!(s.member("left"), Some(ScriptValue::Double(5.0)));
        assert_eq!(s.member("content_height"), Some(ScriptValue::Double(20.0)));
        assert_eq!(s.member("content_lines"), Some(ScriptValue::Int(2)));
        assert_eq!(s.member("alignment"), None);
        assert_eq!(s.member("colour"), None);
    }

    #[test]
    fn test_listeners_are_weak() {
        let mut s = style();
        let recorder = Rc::new(Recorder { seen: Cell::new(0) });
        let listener: Rc<dyn StyleListener> = recorder.clone();
        s.add_listener(&listener);
        assert_eq!(s.listener_count(), 1);

        s.tell_listeners(ChangeMask::MASK);
        assert_eq!(recorder.seen.get(), ChangeMask::MASK.bits());

        drop(listener);
        drop(recorder);
        assert_eq!(s.listener_count(), 0);
        s.tell_listeners(ChangeMask::SIZE);
    }

    #[test]
    fn test_remove_listener() {
        let mut s = style();
        let listener: Rc<dyn StyleListener> = Rc::new(Recorder { seen: Cell::new(0) });
        s.add_listener(&listener);
        s.remove_listener(&listener);
        assert_eq!(s.listener_count(), 0);
    }
}
