//! Script engines.
//!
//! The propagation engine never interprets scripts itself. It asks a
//! [`ScriptEngine`] to evaluate a script in a context, and to list what a
//! script can read so dependencies can be discovered without running it.
//!
//! [`ExprEngine`] is the bundled engine for [`Expr`] scripts. Games extend
//! it with native functions:
//!
//! ```
//! use set_script::core::ScriptError;
//! use set_script::script::{ExprEngine, ScriptValue};
//!
//! let engine = ExprEngine::new().with_function("upper", |args| {
//!     match args.first() {
//!         Some(ScriptValue::Text(s)) => Ok(ScriptValue::Text(s.to_uppercase())),
//!         _ => Err(ScriptError::Raised("upper: expected text".into())),
//!     }
//! });
//! assert!(engine.has_function("upper"));
//! ```

use rustc_hash::FxHashMap;

use crate::core::ScriptError;
use crate::data::Set;

use super::context::Context;
use super::expr::{BinOp, Expr, Script};
use super::reads::VariableReads;
use super::value::{Handle, ScriptValue};

/// Evaluates scripts and reports what they read.
pub trait ScriptEngine {
    /// Evaluate a script in a context against the set.
    fn evaluate(
        &self,
        script: &Script,
        ctx: &mut Context,
        set: &Set,
    ) -> Result<ScriptValue, ScriptError>;

    /// Every location the script can read, without running it.
    fn static_dependencies(&self, script: &Script) -> VariableReads;
}

/// A native function callable from expressions.
pub type NativeFunction = Box<dyn Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptError>>;

/// The bundled expression engine.
#[derive(Default)]
pub struct ExprEngine {
    functions: FxHashMap<String, NativeFunction>,
}

impl std::fmt::Debug for ExprEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("ExprEngine").field("functions", &names).finish()
    }
}

impl ExprEngine {
    /// Create an engine with no native functions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a native function.
    #[must_use]
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        function: impl Fn(&[ScriptValue]) -> Result<ScriptValue, ScriptError> + 'static,
    ) -> Self {
        self.functions.insert(name.into(), Box::new(function));
        self
    }

    /// Check if a native function is registered.
    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Evaluate an expression.
    pub fn eval(&self, expr: &Expr, ctx: &mut Context, set: &Set) -> Result<ScriptValue, ScriptError> {
        match expr {
            Expr::Lit(value) => Ok(value.clone()),

            Expr::Var(name) => ctx.get(name).cloned(),

            Expr::Member(object, name) => {
                let object = self.eval(object, ctx, set)?;
                member_of(&object, name, set)
            }

            Expr::Let(name, value) => {
                let value = self.eval(value, ctx, set)?;
                ctx.set_variable(name.clone(), value.clone());
                Ok(value)
            }

            Expr::Seq(exprs) => {
                let mut last = ScriptValue::Nil;
                for expr in exprs {
                    last = self.eval(expr, ctx, set)?;
                }
                Ok(last)
            }

            Expr::Concat(exprs) => {
                let mut text = String::new();
                for expr in exprs {
                    text.push_str(&self.eval(expr, ctx, set)?.to_text());
                }
                Ok(ScriptValue::Text(text))
            }

            Expr::Binary(op, a, b) => {
                let a = self.eval(a, ctx, set)?;
                let b = self.eval(b, ctx, set)?;
                binary(*op, &a, &b)
            }

            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond, ctx, set)?.is_truthy() {
                    self.eval(then, ctx, set)
                } else {
                    self.eval(otherwise, ctx, set)
                }
            }

            Expr::Count(inner) => match self.eval(inner, ctx, set)? {
                ScriptValue::List(items) => Ok(ScriptValue::Int(items.len() as i64)),
                ScriptValue::Text(s) => Ok(ScriptValue::Int(s.chars().count() as i64)),
                ScriptValue::Nil => Ok(ScriptValue::Int(0)),
                other => Err(ScriptError::TypeMismatch {
                    expected: "list",
                    found: other.type_name(),
                }),
            },

            Expr::Keywords(inner) => {
                let text = self.eval(inner, ctx, set)?.to_text();
                Ok(ScriptValue::List(
                    set.find_keywords(&text)
                        .into_iter()
                        .map(ScriptValue::Text)
                        .collect(),
                ))
            }

            Expr::Fail(message) => Err(ScriptError::Raised(message.clone())),

            Expr::Call(name, args) => {
                let function = self
                    .functions
                    .get(name)
                    .ok_or_else(|| ScriptError::UnknownFunction(name.clone()))?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, ctx, set))
                    .collect::<Result<Vec<_>, _>>()?;
                function(&args)
            }
        }
    }
}

impl ScriptEngine for ExprEngine {
    fn evaluate(
        &self,
        script: &Script,
        ctx: &mut Context,
        set: &Set,
    ) -> Result<ScriptValue, ScriptError> {
        match script {
            Script::Expr(expr) => self.eval(expr, ctx, set),
            Script::Source(_) => Err(ScriptError::Raised(
                "source scripts need a host script engine".into(),
            )),
        }
    }

    fn static_dependencies(&self, script: &Script) -> VariableReads {
        match script {
            Script::Expr(expr) => expr.reads(),
            Script::Source(_) => VariableReads::new(),
        }
    }
}

fn binary(op: BinOp, a: &ScriptValue, b: &ScriptValue) -> Result<ScriptValue, ScriptError> {
    use ScriptValue::{Double, Int, Text};

    match op {
        BinOp::Eq => return Ok(ScriptValue::Bool(a == b)),
        BinOp::Add if matches!(a, Text(_)) || matches!(b, Text(_)) => {
            return Ok(Text(a.to_text() + &b.to_text()));
        }
        BinOp::Lt => {
            if let (Text(x), Text(y)) = (a, b) {
                return Ok(ScriptValue::Bool(x < y));
            }
        }
        _ => {}
    }

    if let (Int(x), Int(y)) = (a, b) {
        return match op {
            BinOp::Add => Ok(Int(x.wrapping_add(*y))),
            BinOp::Sub => Ok(Int(x.wrapping_sub(*y))),
            BinOp::Mul => Ok(Int(x.wrapping_mul(*y))),
            BinOp::Div if *y == 0 => Err(ScriptError::Raised("division by zero".into())),
            BinOp::Div => x
                .checked_div(*y)
                .map(Int)
                .ok_or_else(|| ScriptError::Raised("integer overflow in division".into())),
            BinOp::Lt => Ok(ScriptValue::Bool(x < y)),
            BinOp::Eq => Ok(ScriptValue::Bool(x == y)),
        };
    }

    let number = |v: &ScriptValue| {
        v.as_f64().ok_or(ScriptError::TypeMismatch {
            expected: "number",
            found: v.type_name(),
        })
    };
    let (x, y) = (number(a)?, number(b)?);
    match op {
        BinOp::Add => Ok(Double(x + y)),
        BinOp::Sub => Ok(Double(x - y)),
        BinOp::Mul => Ok(Double(x * y)),
        BinOp::Div if y == 0.0 => Err(ScriptError::Raised("division by zero".into())),
        BinOp::Div => Ok(Double(x / y)),
        BinOp::Lt => Ok(ScriptValue::Bool(x < y)),
        BinOp::Eq => Ok(ScriptValue::Bool(x == y)),
    }
}

fn no_member(object: impl Into<String>, member: &str) -> ScriptError {
    ScriptError::NoMember {
        object: object.into(),
        member: member.to_string(),
    }
}

/// Resolve `object.name` against the set.
fn member_of(object: &ScriptValue, name: &str, set: &Set) -> Result<ScriptValue, ScriptError> {
    let handle = match object {
        ScriptValue::Handle(handle) => *handle,
        ScriptValue::List(items) if name == "length" => {
            return Ok(ScriptValue::Int(items.len() as i64));
        }
        other => return Err(no_member(other.type_name(), name)),
    };
    let missing = |e: crate::core::StructuralError| ScriptError::Raised(e.to_string());

    match handle {
        Handle::Game => match name {
            "name" => Ok(ScriptValue::Text(set.game().name.clone())),
            _ => Err(no_member("game", name)),
        },

        Handle::Set => {
            if name == "cards" {
                return Ok(ScriptValue::List(
                    set.cards()
                        .iter()
                        .map(|card| ScriptValue::Handle(Handle::Card(card.id())))
                        .collect(),
                ));
            }
            let index = set
                .game()
                .set_field_index(name)
                .ok_or_else(|| no_member("set", name))?;
            Ok(set.data()[index].script_value())
        }

        Handle::Card(card) => {
            let card = set.card(card).map_err(missing)?;
            let index = set
                .game()
                .card_field_index(name)
                .ok_or_else(|| no_member("card", name))?;
            Ok(card.data[index].script_value())
        }

        Handle::Styling { stylesheet, card } => {
            let sheet = set.stylesheet(stylesheet).map_err(missing)?;
            let index = sheet
                .styling_field_index(name)
                .ok_or_else(|| no_member("styling", name))?;
            let values = set.styling_values(stylesheet, card).map_err(missing)?;
            Ok(values[index].script_value())
        }

        Handle::ExtraCard { card, stylesheet } => {
            let sheet = set.stylesheet(stylesheet).map_err(missing)?;
            let index = sheet
                .extra_card_field_index(name)
                .ok_or_else(|| no_member("extra_card", name))?;
            let values = set.extra_values(card, stylesheet).map_err(missing)?;
            values
                .get(index)
                .map(|value| value.script_value())
                .ok_or_else(|| no_member("extra_card", name))
        }

        Handle::StyleSheet(stylesheet) => {
            let sheet = set.stylesheet(stylesheet).map_err(missing)?;
            match name {
                "name" => Ok(ScriptValue::Text(sheet.name.clone())),
                "card_width" => Ok(ScriptValue::Double(sheet.card_width)),
                "card_height" => Ok(ScriptValue::Double(sheet.card_height)),
                "card_dpi" => Ok(ScriptValue::Double(sheet.card_dpi)),
                _ => Err(no_member("stylesheet", name)),
            }
        }

        Handle::CardStyle(stylesheet) => {
            let index = set
                .game()
                .card_field_index(name)
                .ok_or_else(|| no_member("card_style", name))?;
            Ok(ScriptValue::Handle(Handle::Style {
                stylesheet,
                field: index,
                extra: false,
            }))
        }

        Handle::ExtraCardStyle(stylesheet) => {
            let sheet = set.stylesheet(stylesheet).map_err(missing)?;
            let index = sheet
                .extra_card_field_index(name)
                .ok_or_else(|| no_member("extra_card_style", name))?;
            Ok(ScriptValue::Handle(Handle::Style {
                stylesheet,
                field: index,
                extra: true,
            }))
        }

        Handle::Style {
            stylesheet,
            field,
            extra,
        } => {
            let sheet = set.stylesheet(stylesheet).map_err(missing)?;
            let style = sheet
                .style(field, extra)
                .ok_or_else(|| no_member("style", name))?;
            style.member(name).ok_or_else(|| no_member("style", name))
        }
    }
}
