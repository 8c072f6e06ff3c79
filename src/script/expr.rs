//! Script expressions.
//!
//! `Expr` is the script representation understood by the bundled
//! [`ExprEngine`](super::ExprEngine). Hosts with their own script language
//! implement [`ScriptEngine`](super::ScriptEngine) instead and keep their own
//! representation behind [`Script::Source`].
//!
//! Expressions are plain data: they can be built with the helper
//! constructors, compared, cloned and serialized.
//!
//! ```
//! use set_script::script::Expr;
//!
//! // card.power + "/" + card.toughness
//! let pt = Expr::concat([Expr::card("power"), Expr::text("/"), Expr::card("toughness")]);
//! let reads = pt.reads();
//! assert_eq!(reads.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

use super::reads::{VariableReads, VariableRef};
use super::value::ScriptValue;
use super::vars;

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
}

/// A script expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    // === Values ===

    /// A literal value.
    Lit(ScriptValue),

    /// Read a context variable.
    Var(String),

    /// Read a member of an object.
    Member(Box<Expr>, String),

    /// Bind a context variable and yield the bound value.
    Let(String, Box<Expr>),

    // === Combinators ===

    /// Evaluate in order, yield the last value.
    Seq(Vec<Expr>),

    /// Concatenate the text forms of all values.
    Concat(Vec<Expr>),

    /// Arithmetic or comparison.
    Binary(BinOp, Box<Expr>, Box<Expr>),

    /// Conditional.
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    // === Builtins ===

    /// Number of items in a list, or characters in a text.
    Count(Box<Expr>),

    /// Names of the set's keywords that occur in a text.
    Keywords(Box<Expr>),

    /// Raise an error.
    Fail(String),

    /// Call a function registered with the engine.
    Call(String, Vec<Expr>),
}

impl Expr {
    /// A literal.
    pub fn lit(value: impl Into<ScriptValue>) -> Self {
        Self::Lit(value.into())
    }

    /// A text literal.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Lit(ScriptValue::Text(s.into()))
    }

    /// A variable read.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    /// `card.<name>`
    pub fn card(name: impl Into<String>) -> Self {
        Self::var(vars::CARD).member(name)
    }

    /// `set.<name>`
    pub fn set(name: impl Into<String>) -> Self {
        Self::var(vars::SET).member(name)
    }

    /// `set.cards`
    pub fn cards() -> Self {
        Self::set("cards")
    }

    /// `styling.<name>`
    pub fn styling(name: impl Into<String>) -> Self {
        Self::var(vars::STYLING).member(name)
    }

    /// `extra_card.<name>`
    pub fn extra_card(name: impl Into<String>) -> Self {
        Self::var(vars::EXTRA_CARD).member(name)
    }

    /// `card_style.<field>.<member>`
    pub fn card_style(field: impl Into<String>, member: impl Into<String>) -> Self {
        Self::var(vars::CARD_STYLE).member(field).member(member)
    }

    /// `extra_card_style.<field>.<member>`
    pub fn extra_card_style(field: impl Into<String>, member: impl Into<String>) -> Self {
        Self::var(vars::EXTRA_CARD_STYLE).member(field).member(member)
    }

    /// Read a member of this expression's value.
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::Member(Box::new(self), name.into())
    }

    /// Bind a variable.
    pub fn let_(name: impl Into<String>, value: Expr) -> Self {
        Self::Let(name.into(), Box::new(value))
    }

    /// Sequence.
    pub fn seq(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self::Seq(exprs.into_iter().collect())
    }

    /// Concatenation.
    pub fn concat(exprs: impl IntoIterator<Item = Expr>) -> Self {
        Self::Concat(exprs.into_iter().collect())
    }

    /// `self + other`
    pub fn add(self, other: Expr) -> Self {
        Self::Binary(BinOp::Add, Box::new(self), Box::new(other))
    }

    /// `self - other`
    pub fn sub(self, other: Expr) -> Self {
        Self::Binary(BinOp::Sub, Box::new(self), Box::new(other))
    }

    /// `self * other`
    pub fn mul(self, other: Expr) -> Self {
        Self::Binary(BinOp::Mul, Box::new(self), Box::new(other))
    }

    /// `self / other`
    pub fn div(self, other: Expr) -> Self {
        Self::Binary(BinOp::Div, Box::new(self), Box::new(other))
    }

    /// `self == other`
    pub fn eq(self, other: Expr) -> Self {
        Self::Binary(BinOp::Eq, Box::new(self), Box::new(other))
    }

    /// `self < other`
    pub fn lt(self, other: Expr) -> Self {
        Self::Binary(BinOp::Lt, Box::new(self), Box::new(other))
    }

    /// `if cond then a else b`
    pub fn if_(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Self::If {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Count items.
    pub fn count(self) -> Self {
        Self::Count(Box::new(self))
    }

    /// Keywords occurring in this expression's text.
    pub fn keywords(self) -> Self {
        Self::Keywords(Box::new(self))
    }

    /// Raise an error.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    /// Call a registered function.
    pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Call(name.into(), args.into_iter().collect())
    }

    /// Every location this expression can read.
    #[must_use]
    pub fn reads(&self) -> VariableReads {
        let mut reads = VariableReads::new();
        self.collect_reads(&mut reads);
        if let Some(target) = self.copy_target() {
            reads.set_forward(target);
        }
        reads
    }

    /// The field this expression is a plain copy of.
    fn copy_target(&self) -> Option<VariableRef> {
        let Expr::Member(object, name) = self else {
            return None;
        };
        match object.as_ref() {
            Expr::Var(var) if var == vars::CARD => Some(VariableRef::CardField(name.clone())),
            Expr::Var(var) if var == vars::SET && name != "cards" => {
                Some(VariableRef::SetField(name.clone()))
            }
            _ => None,
        }
    }

    fn collect_reads(&self, out: &mut VariableReads) {
        match self {
            Expr::Lit(_) | Expr::Fail(_) => {}
            Expr::Var(name) if name == vars::STYLESHEET => out.add(VariableRef::StyleSheet),
            Expr::Var(name) => out.add(VariableRef::Variable(name.clone())),
            Expr::Member(object, name) => match object.as_ref() {
                Expr::Var(var) => match var.as_str() {
                    vars::CARD => out.add(VariableRef::CardField(name.clone())),
                    vars::SET if name == "cards" => out.add(VariableRef::CardList),
                    vars::SET => out.add(VariableRef::SetField(name.clone())),
                    vars::STYLING => out.add(VariableRef::StylingField(name.clone())),
                    vars::EXTRA_CARD => out.add(VariableRef::ExtraCardField(name.clone())),
                    _ => object.collect_reads(out),
                },
                Expr::Member(inner, field) => match inner.as_ref() {
                    Expr::Var(var) if var == vars::CARD_STYLE || var == vars::EXTRA_CARD_STYLE => {
                        out.add(VariableRef::StyleMember {
                            field: field.clone(),
                            member: name.clone(),
                        });
                    }
                    _ => object.collect_reads(out),
                },
                _ => object.collect_reads(out),
            },
            Expr::Let(_, value) => value.collect_reads(out),
            Expr::Seq(exprs) | Expr::Concat(exprs) | Expr::Call(_, exprs) => {
                for expr in exprs {
                    expr.collect_reads(out);
                }
            }
            Expr::Binary(_, a, b) => {
                a.collect_reads(out);
                b.collect_reads(out);
            }
            Expr::If {
                cond,
                then,
                otherwise,
            } => {
                cond.collect_reads(out);
                then.collect_reads(out);
                otherwise.collect_reads(out);
            }
            Expr::Count(inner) => inner.collect_reads(out),
            Expr::Keywords(inner) => {
                out.add(VariableRef::Keywords);
                inner.collect_reads(out);
            }
        }
    }
}

/// A script attached to a field or style parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Script {
    /// An expression for the bundled engine.
    Expr(Expr),
    /// Source text for a host-provided engine.
    Source(String),
}

impl Script {
    /// Wrap an expression.
    pub fn expr(expr: Expr) -> Self {
        Self::Expr(expr)
    }

    /// Wrap host source text.
    pub fn source(text: impl Into<String>) -> Self {
        Self::Source(text.into())
    }

    /// The expression, if this is one.
    #[must_use]
    pub fn as_expr(&self) -> Option<&Expr> {
        match self {
            Script::Expr(expr) => Some(expr),
            Script::Source(_) => None,
        }
    }
}

impl From<Expr> for Script {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}
