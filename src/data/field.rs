//! Field descriptions.
//!
//! A field is one entry of a schema list: a card field, set field, styling
//! field or extra card field. Its position in the list is its
//! `FieldIndex`, assigned once when the field is added to the schema.

use serde::{Deserialize, Serialize};

use crate::core::{FieldIndex, ScriptError, StructuralError};
use crate::dependency::{Dependencies, Dependency};
use crate::script::{vars, Context, Script, ScriptEngine, ScriptValue, VariableReads};

use super::set::Set;
use super::value::Value;

/// The kind of content a field holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Choice,
    MultipleChoice,
    Boolean,
    Image,
    Symbol,
    Color,
    Info,
    PackageChoice,
}

impl FieldKind {
    /// All kinds, in tag order.
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Text,
        FieldKind::Choice,
        FieldKind::MultipleChoice,
        FieldKind::Boolean,
        FieldKind::Image,
        FieldKind::Symbol,
        FieldKind::Color,
        FieldKind::Info,
        FieldKind::PackageChoice,
    ];

    /// Parse a field type tag.
    pub fn from_tag(tag: &str) -> Result<Self, StructuralError> {
        if tag.is_empty() {
            return Err(StructuralError::MissingFieldType);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| StructuralError::UnknownFieldType(tag.to_string()))
    }

    /// The tag this kind is written as.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Choice => "choice",
            FieldKind::MultipleChoice => "multiple choice",
            FieldKind::Boolean => "boolean",
            FieldKind::Image => "image",
            FieldKind::Symbol => "symbol",
            FieldKind::Color => "color",
            FieldKind::Info => "info",
            FieldKind::PackageChoice => "package choice",
        }
    }
}

/// A field of a schema list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    index: FieldIndex,
    pub name: String,
    pub kind: FieldKind,
    pub script: Option<Script>,
    pub default_script: Option<Script>,
    pub sort_script: Option<Script>,
    /// Content of a fresh value.
    pub initial: ScriptValue,
    pub editable: bool,
    #[serde(skip)]
    dependent_scripts: Dependencies,
}

impl Field {
    /// Create a field. The index is assigned when it is added to a schema.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            index: FieldIndex(0),
            name: name.into(),
            kind,
            script: None,
            default_script: None,
            sort_script: None,
            initial: ScriptValue::Nil,
            editable: true,
            dependent_scripts: Dependencies::new(),
        }
    }

    /// A text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Parse the kind from a type tag.
    pub fn from_tag(name: impl Into<String>, tag: &str) -> Result<Self, StructuralError> {
        Ok(Self::new(name, FieldKind::from_tag(tag)?))
    }

    /// Set the value script.
    #[must_use]
    pub fn with_script(mut self, script: impl Into<Script>) -> Self {
        self.script = Some(script.into());
        self
    }

    /// Set the default script.
    #[must_use]
    pub fn with_default(mut self, script: impl Into<Script>) -> Self {
        self.default_script = Some(script.into());
        self
    }

    /// Set the sort script.
    #[must_use]
    pub fn with_sort_script(mut self, script: impl Into<Script>) -> Self {
        self.sort_script = Some(script.into());
        self
    }

    /// Set the initial content.
    #[must_use]
    pub fn with_initial(mut self, initial: impl Into<ScriptValue>) -> Self {
        self.initial = initial.into();
        self
    }

    /// Make the field read-only for users.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// Position in the schema list.
    #[must_use]
    pub fn index(&self) -> FieldIndex {
        self.index
    }

    pub(crate) fn assign_index(&mut self, index: FieldIndex) {
        self.index = index;
    }

    /// Everything that must be refreshed when a value of this field changes.
    #[must_use]
    pub fn dependent_scripts(&self) -> &Dependencies {
        &self.dependent_scripts
    }

    pub(crate) fn add_dependent(&mut self, dependency: Dependency) -> bool {
        self.dependent_scripts.add(dependency)
    }

    /// Check if any script is attached.
    #[must_use]
    pub fn is_scripted(&self) -> bool {
        self.script.is_some() || self.default_script.is_some() || self.sort_script.is_some()
    }

    /// What the field's scripts can read. The forward target is taken from
    /// the value script only.
    pub fn script_reads<E: ScriptEngine + ?Sized>(&self, engine: &E) -> VariableReads {
        let mut reads = self
            .script
            .as_ref()
            .map(|script| engine.static_dependencies(script))
            .unwrap_or_default();
        for script in [&self.default_script, &self.sort_script].into_iter().flatten() {
            let mut extra = engine.static_dependencies(script);
            extra.clear_forward();
            reads.extend(extra);
        }
        reads
    }

    /// A fresh value of this field.
    #[must_use]
    pub fn new_value(&self) -> Value {
        Value::new(self.index, self.initial.clone())
    }

    /// Compute new content and sort value for a value of this field.
    ///
    /// `current` is the value's content, `is_default` whether it was never
    /// edited. Nothing is stored; any error leaves the caller's value
    /// untouched.
    pub fn evaluate<E: ScriptEngine + ?Sized>(
        &self,
        engine: &E,
        ctx: &mut Context,
        set: &Set,
        current: &ScriptValue,
        is_default: bool,
    ) -> Result<(ScriptValue, String), ScriptError> {
        let mut content = current.clone();
        if is_default {
            if let Some(default) = &self.default_script {
                content = ctx.scoped(|ctx| engine.evaluate(default, ctx, set))?;
            }
        }
        if let Some(script) = &self.script {
            content = ctx.scoped(|ctx| {
                ctx.set_variable(vars::VALUE, content.clone());
                engine.evaluate(script, ctx, set)
            })?;
        }
        let sort = match &self.sort_script {
            Some(script) => ctx
                .scoped(|ctx| {
                    ctx.set_variable(vars::VALUE, content.clone());
                    engine.evaluate(script, ctx, set)
                })?
                .to_text(),
            None => content.to_text(),
        };
        Ok((content, sort))
    }
}
