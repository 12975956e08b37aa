//! Row predicates.
//!
//! A [`Condition`] is a small boolean expression over the columns of a row. It can be built with
//! the [`col`] / [`lit`] helpers or parsed from a query string:
//!
//! ```rust
//! use rust_panel_data::query::{col, Condition};
//!
//! let parsed: Condition = "B == 'x' and (A > 1 or not A >= 10)".parse().unwrap();
//! let built = col("B").eq("x").and(col("A").gt(1).or(col("A").ge(10).not()));
//! assert_eq!(parsed, built);
//! ```
//!
//! Query grammar (lowest precedence first):
//!
//! - `or` / `|`
//! - `and` / `&`
//! - `not` / `~`
//! - comparisons `==`, `!=`, `<`, `<=`, `>`, `>=`
//!
//! Operands are column names (bare identifiers, or back-quoted for names with spaces), string
//! literals in single or double quotes, integers, floats, `True`/`False` and `null`.
//!
//! Comparison with a null operand is `false`, except `!=` which is `true`. Ordering two values of
//! incompatible types (e.g. a string and a number) is a [`PanelError::TypeMismatch`].

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{PanelError, PanelResult};
use crate::types::{Schema, Value};

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Reference to a column of the row being tested.
    Column(String),
    /// Constant value.
    Literal(Value),
}

impl Operand {
    /// Compare this operand against another one.
    pub fn compare(self, op: CompareOp, rhs: impl Into<Operand>) -> Condition {
        Condition::Compare {
            lhs: self,
            op,
            rhs: rhs.into(),
        }
    }

    pub fn eq(self, rhs: impl Into<Operand>) -> Condition {
        self.compare(CompareOp::Eq, rhs)
    }

    pub fn ne(self, rhs: impl Into<Operand>) -> Condition {
        self.compare(CompareOp::Ne, rhs)
    }

    pub fn lt(self, rhs: impl Into<Operand>) -> Condition {
        self.compare(CompareOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl Into<Operand>) -> Condition {
        self.compare(CompareOp::Le, rhs)
    }

    pub fn gt(self, rhs: impl Into<Operand>) -> Condition {
        self.compare(CompareOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl Into<Operand>) -> Condition {
        self.compare(CompareOp::Ge, rhs)
    }
}

impl<T: Into<Value>> From<T> for Operand {
    fn from(v: T) -> Self {
        Self::Literal(v.into())
    }
}

/// Column reference operand.
pub fn col(name: impl Into<String>) -> Operand {
    Operand::Column(name.into())
}

/// Literal operand.
pub fn lit(value: impl Into<Value>) -> Operand {
    Operand::Literal(value.into())
}

/// Boolean expression over a row.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Compare {
        lhs: Operand,
        op: CompareOp,
        rhs: Operand,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Parse a query string. Equivalent to `query.parse::<Condition>()`.
    pub fn parse(query: &str) -> PanelResult<Self> {
        Parser::new(query)?.parse_query()
    }

    pub fn and(self, other: Condition) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Condition) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Names of all columns referenced by the condition, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Compare { lhs, rhs, .. } => {
                for operand in [lhs, rhs] {
                    if let Operand::Column(name) = operand {
                        if !out.contains(&name.as_str()) {
                            out.push(name.as_str());
                        }
                    }
                }
            }
            Self::And(a, b) | Self::Or(a, b) => {
                a.collect_columns(out);
                b.collect_columns(out);
            }
            Self::Not(inner) => inner.collect_columns(out),
        }
    }

    /// Resolve column names against `schema`.
    pub fn bind<'a>(&'a self, schema: &Schema) -> PanelResult<BoundCondition<'a>> {
        let mut indices = Vec::new();
        for name in self.columns() {
            indices.push((name, schema.require(name)?));
        }
        Ok(BoundCondition {
            condition: self,
            indices,
        })
    }
}

impl FromStr for Condition {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) if is_bare_identifier(name) => f.write_str(name),
            Self::Column(name) => write!(f, "`{name}`"),
            Self::Literal(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { lhs, op, rhs } => write!(f, "{lhs} {} {rhs}", op.symbol()),
            Self::And(a, b) => write!(f, "({a} and {b})"),
            Self::Or(a, b) => write!(f, "({a} or {b})"),
            Self::Not(inner) => write!(f, "not ({inner})"),
        }
    }
}

fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !matches!(name, "and" | "or" | "not" | "True" | "False" | "true" | "false" | "null" | "None")
}

/// Conversion into a [`Condition`], so operations accept either a built condition or a query
/// string.
pub trait IntoCondition {
    fn into_condition(self) -> PanelResult<Condition>;
}

impl IntoCondition for Condition {
    fn into_condition(self) -> PanelResult<Condition> {
        Ok(self)
    }
}

impl IntoCondition for &Condition {
    fn into_condition(self) -> PanelResult<Condition> {
        Ok(self.clone())
    }
}

impl IntoCondition for &str {
    fn into_condition(self) -> PanelResult<Condition> {
        Condition::parse(self)
    }
}

impl IntoCondition for String {
    fn into_condition(self) -> PanelResult<Condition> {
        Condition::parse(&self)
    }
}

/// A [`Condition`] whose column references have been resolved to row positions.
#[derive(Debug)]
pub struct BoundCondition<'a> {
    condition: &'a Condition,
    indices: Vec<(&'a str, usize)>,
}

impl BoundCondition<'_> {
    /// Evaluate against one row laid out by the schema the condition was bound to.
    pub fn evaluate(&self, row: &[Value]) -> PanelResult<bool> {
        self.eval(self.condition, row)
    }

    fn eval(&self, cond: &Condition, row: &[Value]) -> PanelResult<bool> {
        match cond {
            Condition::Compare { lhs, op, rhs } => {
                let l = self.resolve(lhs, row);
                let r = self.resolve(rhs, row);
                compare(l, *op, r).map_err(|message| {
                    let column = match (lhs, rhs) {
                        (Operand::Column(name), _) | (_, Operand::Column(name)) => name.as_str(),
                        _ => "<literal>",
                    };
                    PanelError::type_mismatch(column, message)
                })
            }
            Condition::And(a, b) => Ok(self.eval(a, row)? && self.eval(b, row)?),
            Condition::Or(a, b) => Ok(self.eval(a, row)? || self.eval(b, row)?),
            Condition::Not(inner) => Ok(!self.eval(inner, row)?),
        }
    }

    fn resolve<'r>(&'r self, operand: &'r Operand, row: &'r [Value]) -> &'r Value {
        match operand {
            Operand::Literal(v) => v,
            Operand::Column(name) => self
                .indices
                .iter()
                .find(|(n, _)| *n == name.as_str())
                .and_then(|(_, idx)| row.get(*idx))
                .unwrap_or(&NULL),
        }
    }
}

static NULL: Value = Value::Null;

fn compare(l: &Value, op: CompareOp, r: &Value) -> Result<bool, String> {
    if l.is_null() || r.is_null() {
        return Ok(op == CompareOp::Ne);
    }

    let ordering = match (l, r) {
        (Value::Utf8(a), Value::Utf8(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Int64(a), Value::Int64(b)) => Some(a.cmp(b)),
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => {
                return match op {
                    CompareOp::Eq => Ok(false),
                    CompareOp::Ne => Ok(true),
                    _ => Err(format!(
                        "cannot order {l} and {r} with '{}'",
                        op.symbol()
                    )),
                };
            }
        },
    };

    // NaN never orders; only `!=` holds.
    let Some(ordering) = ordering else {
        return Ok(op == CompareOp::Ne);
    };

    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Literal(Value),
    Op(CompareOp),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

/// Deepest `not` / parenthesis nesting a query string may use.
const MAX_NESTING: usize = 64;

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn new(input: &str) -> PanelResult<Self> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            end: input.len(),
            depth: 0,
        })
    }

    fn parse_query(mut self) -> PanelResult<Condition> {
        if self.tokens.is_empty() {
            return Err(query_error(0, "empty query"));
        }
        let cond = self.parse_or()?;
        if let Some((offset, tok)) = self.tokens.get(self.pos) {
            return Err(query_error(*offset, format!("unexpected token {tok:?}")));
        }
        Ok(cond)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |(o, _)| *o)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_or(&mut self) -> PanelResult<Condition> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            lhs = lhs.or(self.parse_and()?);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PanelResult<Condition> {
        let mut lhs = self.parse_not()?;
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            lhs = lhs.and(self.parse_not()?);
        }
        Ok(lhs)
    }

    fn descend(&mut self) -> PanelResult<()> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(query_error(
                self.offset(),
                format!("query nested deeper than {MAX_NESTING} levels"),
            ));
        }
        Ok(())
    }

    fn parse_not(&mut self) -> PanelResult<Condition> {
        if self.peek() == Some(&Token::Not) {
            self.pos += 1;
            self.descend()?;
            let inner = self.parse_not()?;
            self.depth -= 1;
            return Ok(inner.not());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> PanelResult<Condition> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            self.descend()?;
            let inner = self.parse_or()?;
            self.depth -= 1;
            let offset = self.offset();
            return match self.next() {
                Some(Token::RParen) => Ok(inner),
                _ => Err(query_error(offset, "expected ')'")),
            };
        }

        let lhs = self.parse_operand()?;
        let offset = self.offset();
        let op = match self.next() {
            Some(Token::Op(op)) => op,
            _ => return Err(query_error(offset, "expected comparison operator")),
        };
        let rhs = self.parse_operand()?;
        Ok(lhs.compare(op, rhs))
    }

    fn parse_operand(&mut self) -> PanelResult<Operand> {
        let offset = self.offset();
        match self.next() {
            Some(Token::Ident(name)) => Ok(Operand::Column(name)),
            Some(Token::Literal(v)) => Ok(Operand::Literal(v)),
            Some(tok) => Err(query_error(offset, format!("expected operand, found {tok:?}"))),
            None => Err(query_error(offset, "expected operand, found end of query")),
        }
    }
}

fn query_error(position: usize, message: impl Into<String>) -> PanelError {
    PanelError::Query {
        position,
        message: message.into(),
    }
}

fn tokenize(input: &str) -> PanelResult<Vec<(usize, Token)>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let token = match c {
            '(' => {
                chars.next();
                Token::LParen
            }
            ')' => {
                chars.next();
                Token::RParen
            }
            '&' => {
                chars.next();
                Token::And
            }
            '|' => {
                chars.next();
                Token::Or
            }
            '~' => {
                chars.next();
                Token::Not
            }
            '=' | '!' | '<' | '>' => {
                chars.next();
                let followed_by_eq = matches!(chars.peek(), Some((_, '=')));
                if followed_by_eq {
                    chars.next();
                }
                let op = match (c, followed_by_eq) {
                    ('=', true) => CompareOp::Eq,
                    ('!', true) => CompareOp::Ne,
                    ('<', false) => CompareOp::Lt,
                    ('<', true) => CompareOp::Le,
                    ('>', false) => CompareOp::Gt,
                    ('>', true) => CompareOp::Ge,
                    _ => return Err(query_error(start, format!("unknown operator '{c}'"))),
                };
                Token::Op(op)
            }
            '\'' | '"' | '`' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                for (_, ch) in chars.by_ref() {
                    if ch == c {
                        closed = true;
                        break;
                    }
                    text.push(ch);
                }
                if !closed {
                    return Err(query_error(start, "unterminated quote"));
                }
                if c == '`' {
                    Token::Ident(text)
                } else {
                    Token::Literal(Value::Utf8(text))
                }
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut text = String::new();
                text.push(c);
                chars.next();
                while let Some(&(_, ch)) = chars.peek() {
                    let exponent_sign =
                        (ch == '-' || ch == '+') && text.ends_with(['e', 'E']);
                    if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || exponent_sign {
                        text.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                Token::Literal(parse_number(start, &text)?)
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut text = String::new();
                while let Some(&(_, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        text.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match text.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    "True" | "true" => Token::Literal(Value::Bool(true)),
                    "False" | "false" => Token::Literal(Value::Bool(false)),
                    "null" | "None" => Token::Literal(Value::Null),
                    _ => Token::Ident(text),
                }
            }
            other => return Err(query_error(start, format!("unexpected character '{other}'"))),
        };
        tokens.push((start, token));
    }

    Ok(tokens)
}

fn parse_number(position: usize, text: &str) -> PanelResult<Value> {
    let cleaned = text.replace('_', "");
    if let Ok(v) = cleaned.parse::<i64>() {
        return Ok(Value::Int64(v));
    }
    cleaned
        .parse::<f64>()
        .map(Value::Float64)
        .map_err(|_| query_error(position, format!("invalid number '{text}'")))
}
