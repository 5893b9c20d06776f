//! Restricted expression language for cross-field validations.
//!
//! Expressions are parsed into an [`ExprNode`] tree and interpreted; nothing
//! is ever compiled or executed dynamically. Supported:
//! - numeric literals and field references (`capital`, `total_actif`)
//! - arithmetic (`+ - * /`), unary `-` and `!`
//! - comparisons (`== != < <= > >=`, with `=`/`===` and `!==` accepted)
//! - logic (`&&`, `||`, `and`, `or`, `not`)
//! - `abs(x)`, `min(a, ...)`, `max(a, ...)`, `true`, `false`

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use super::parser;
use super::snapshot::{self, DataSnapshot};

/// Expression errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    /// Character the lexer does not know.
    #[error("Unexpected character '{ch}' at position {position}")]
    UnexpectedChar {
        /// The character.
        ch: char,
        /// Zero-based character offset.
        position: usize,
    },

    /// Token in a place the grammar does not allow.
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    /// Input ended in the middle of an expression.
    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    /// Literal that is not a valid number.
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Unknown function name.
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments.
    #[error("Function {function} expects {expected} argument(s), got {got}")]
    Arity {
        /// Function name.
        function: &'static str,
        /// Expected count description.
        expected: &'static str,
        /// Actual count.
        got: usize,
    },

    /// Nesting or tree height above the given limit.
    #[error("Expression nested deeper than {0} levels")]
    TooDeep(usize),

    /// Division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Arithmetic overflow.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Operator applied to a value of the wrong type.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Referenced field holds a non-numeric value.
    #[error("Field '{0}' is not numeric")]
    NonNumericField(String),
}

impl ExprError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnexpectedChar { .. }
            | Self::UnexpectedToken(_)
            | Self::UnexpectedEnd
            | Self::InvalidNumber(_) => "EXPR_SYNTAX",
            Self::UnknownFunction(_) | Self::Arity { .. } => "EXPR_FUNCTION",
            Self::TooDeep(_) => "EXPR_TOO_DEEP",
            Self::DivisionByZero => "EXPR_DIVISION_BY_ZERO",
            Self::Overflow => "EXPR_OVERFLOW",
            Self::TypeMismatch(_) | Self::NonNumericField(_) => "EXPR_TYPE",
        }
    }
}

/// Result alias for expression operations.
pub type ExprResult<T> = Result<T, ExprError>;

/// Runtime value of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprValue {
    /// A number.
    Num(Decimal),
    /// A boolean.
    Bool(bool),
}

impl ExprValue {
    /// Zero is false, everything else true.
    #[must_use]
    pub fn is_truthy(self) -> bool {
        match self {
            Self::Num(n) => !n.is_zero(),
            Self::Bool(b) => b,
        }
    }

    fn number(self, context: &str) -> ExprResult<Decimal> {
        match self {
            Self::Num(n) => Ok(n),
            Self::Bool(_) => Err(ExprError::TypeMismatch(format!(
                "{context} expects a number, got a boolean"
            ))),
        }
    }
}

impl fmt::Display for ExprValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Binding power; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::Ne => 3,
            Self::Lt | Self::Le | Self::Gt | Self::Ge => 4,
            Self::Add | Self::Sub => 5,
            Self::Mul | Self::Div => 6,
        }
    }

    /// Symbol used in messages.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Logical not.
    Not,
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// `abs(x)`
    Abs,
    /// `min(a, ...)`
    Min,
    /// `max(a, ...)`
    Max,
}

impl Function {
    /// Looks up a function by name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "abs" => Some(Self::Abs),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            _ => None,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Min => "min",
            Self::Max => "max",
        }
    }
}

/// Expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprNode {
    /// Numeric literal.
    Number(Decimal),
    /// Boolean literal.
    Bool(bool),
    /// Field reference.
    Field(String),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<ExprNode>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<ExprNode>,
        /// Right operand.
        right: Box<ExprNode>,
    },
    /// Function call.
    Call {
        /// Function.
        function: Function,
        /// Arguments.
        args: Vec<ExprNode>,
    },
}

/// Source of field values during evaluation.
pub trait Variables {
    /// Resolves a field reference.
    ///
    /// # Errors
    ///
    /// Returns an error when the field exists but cannot be used as a value.
    fn lookup(&self, name: &str) -> ExprResult<ExprValue>;
}

/// Missing or empty fields count as zero; booleans stay booleans.
impl Variables for DataSnapshot {
    fn lookup(&self, name: &str) -> ExprResult<ExprValue> {
        match self.get(name) {
            None => Ok(ExprValue::Num(Decimal::ZERO)),
            Some(serde_json::Value::Bool(b)) => Ok(ExprValue::Bool(*b)),
            Some(value) if snapshot::is_empty(value) => Ok(ExprValue::Num(Decimal::ZERO)),
            Some(value) => snapshot::as_decimal(value)
                .map(ExprValue::Num)
                .ok_or_else(|| ExprError::NonNumericField(name.to_string())),
        }
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// Original text.
    pub source: String,
    /// Parsed tree.
    pub root: ExprNode,
}

impl Expression {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns a syntax error if the text is not a valid expression.
    pub fn parse(source: &str) -> ExprResult<Self> {
        Ok(Self {
            source: source.to_string(),
            root: parser::parse(source)?,
        })
    }

    /// Evaluates the expression.
    ///
    /// # Errors
    ///
    /// Returns an error on type mismatches, division by zero or overflow.
    pub fn evaluate(&self, vars: &impl Variables) -> ExprResult<ExprValue> {
        eval(&self.root, vars)
    }

    /// Evaluates the expression and returns its truthiness.
    ///
    /// # Errors
    ///
    /// Same as [`Expression::evaluate`].
    pub fn evaluate_bool(&self, vars: &impl Variables) -> ExprResult<bool> {
        self.evaluate(vars).map(ExprValue::is_truthy)
    }

    /// Field names referenced by the expression, in order of appearance.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_fields(&self.root, &mut out);
        out
    }
}

fn collect_fields<'a>(node: &'a ExprNode, out: &mut Vec<&'a str>) {
    match node {
        ExprNode::Field(name) => {
            if !out.contains(&name.as_str()) {
                out.push(name);
            }
        }
        ExprNode::Unary { operand, .. } => collect_fields(operand, out),
        ExprNode::Binary { left, right, .. } => {
            collect_fields(left, out);
            collect_fields(right, out);
        }
        ExprNode::Call { args, .. } => args.iter().for_each(|a| collect_fields(a, out)),
        ExprNode::Number(_) | ExprNode::Bool(_) => {}
    }
}

fn eval(node: &ExprNode, vars: &impl Variables) -> ExprResult<ExprValue> {
    match node {
        ExprNode::Number(n) => Ok(ExprValue::Num(*n)),
        ExprNode::Bool(b) => Ok(ExprValue::Bool(*b)),
        ExprNode::Field(name) => vars.lookup(name),
        ExprNode::Unary { op, operand } => {
            let value = eval(operand, vars)?;
            match op {
                UnaryOp::Neg => Ok(ExprValue::Num(-value.number("unary -")?)),
                UnaryOp::Not => Ok(ExprValue::Bool(!value.is_truthy())),
            }
        }
        ExprNode::Binary { op, left, right } => eval_binary(*op, left, right, vars),
        ExprNode::Call { function, args } => eval_call(*function, args, vars),
    }
}

fn eval_binary(
    op: BinaryOp,
    left: &ExprNode,
    right: &ExprNode,
    vars: &impl Variables,
) -> ExprResult<ExprValue> {
    // Short-circuit logic first.
    match op {
        BinaryOp::And => {
            let l = eval(left, vars)?.is_truthy();
            return Ok(ExprValue::Bool(l && eval(right, vars)?.is_truthy()));
        }
        BinaryOp::Or => {
            let l = eval(left, vars)?.is_truthy();
            return Ok(ExprValue::Bool(l || eval(right, vars)?.is_truthy()));
        }
        _ => {}
    }

    let l = eval(left, vars)?;
    let r = eval(right, vars)?;
    let symbol = op.symbol();

    let result = match op {
        BinaryOp::Eq | BinaryOp::Ne => {
            let equal = match (l, r) {
                (ExprValue::Num(a), ExprValue::Num(b)) => a == b,
                _ => l.is_truthy() == r.is_truthy(),
            };
            ExprValue::Bool(if op == BinaryOp::Eq { equal } else { !equal })
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let (a, b) = (l.number(symbol)?, r.number(symbol)?);
            ExprValue::Bool(match op {
                BinaryOp::Lt => a < b,
                BinaryOp::Le => a <= b,
                BinaryOp::Gt => a > b,
                _ => a >= b,
            })
        }
        BinaryOp::Add => ExprValue::Num(
            l.number(symbol)?
                .checked_add(r.number(symbol)?)
                .ok_or(ExprError::Overflow)?,
        ),
        BinaryOp::Sub => ExprValue::Num(
            l.number(symbol)?
                .checked_sub(r.number(symbol)?)
                .ok_or(ExprError::Overflow)?,
        ),
        BinaryOp::Mul => ExprValue::Num(
            l.number(symbol)?
                .checked_mul(r.number(symbol)?)
                .ok_or(ExprError::Overflow)?,
        ),
        BinaryOp::Div => {
            let divisor = r.number(symbol)?;
            if divisor.is_zero() {
                return Err(ExprError::DivisionByZero);
            }
            ExprValue::Num(
                l.number(symbol)?
                    .checked_div(divisor)
                    .ok_or(ExprError::Overflow)?,
            )
        }
        BinaryOp::And => ExprValue::Bool(l.is_truthy() && r.is_truthy()),
        BinaryOp::Or => ExprValue::Bool(l.is_truthy() || r.is_truthy()),
    };
    Ok(result)
}

fn eval_call(function: Function, args: &[ExprNode], vars: &impl Variables) -> ExprResult<ExprValue> {
    let values = args
        .iter()
        .map(|a| eval(a, vars).and_then(|v| v.number(function.name())))
        .collect::<ExprResult<Vec<_>>>()?;

    match function {
        Function::Abs => match values.as_slice() {
            [x] => Ok(ExprValue::Num(x.abs())),
            _ => Err(ExprError::Arity {
                function: "abs",
                expected: "1",
                got: values.len(),
            }),
        },
        Function::Min | Function::Max => {
            let folded = if function == Function::Min {
                values.iter().copied().reduce(Decimal::min)
            } else {
                values.iter().copied().reduce(Decimal::max)
            };
            folded.map(ExprValue::Num).ok_or(ExprError::Arity {
                function: function.name(),
                expected: "at least 1",
                got: 0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn data() -> DataSnapshot {
        DataSnapshot::from_value(json!({
            "total_actif": "150000",
            "total_passif": 150000,
            "capital": 10000,
            "resultat": -2500.5,
            "is_listed": true,
            "raison_sociale": "ACME",
            "blank": ""
        }))
    }

    fn eval_str(src: &str) -> ExprResult<ExprValue> {
        Expression::parse(src)?.evaluate(&data())
    }

    #[test]
    fn test_arithmetic_and_precedence() {
        assert_eq!(eval_str("1 + 2 * 3").unwrap(), ExprValue::Num(dec!(7)));
        assert_eq!(eval_str("(1 + 2) * 3").unwrap(), ExprValue::Num(dec!(9)));
        assert_eq!(eval_str("10 - 4 - 3").unwrap(), ExprValue::Num(dec!(3)));
        assert_eq!(eval_str("-capital / 4").unwrap(), ExprValue::Num(dec!(-2500)));
    }

    #[test]
    fn test_field_comparisons() {
        assert_eq!(eval_str("total_actif == total_passif").unwrap(), ExprValue::Bool(true));
        assert_eq!(eval_str("total_actif === total_passif").unwrap(), ExprValue::Bool(true));
        assert_eq!(eval_str("capital >= 10000 && resultat < 0").unwrap(), ExprValue::Bool(true));
        assert_eq!(eval_str("capital > 50000 or not is_listed").unwrap(), ExprValue::Bool(false));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval_str("abs(resultat)").unwrap(), ExprValue::Num(dec!(2500.5)));
        assert_eq!(eval_str("min(capital, 5, 7)").unwrap(), ExprValue::Num(dec!(5)));
        assert_eq!(eval_str("MAX(1, capital)").unwrap(), ExprValue::Num(dec!(10000)));
        assert!(matches!(eval_str("abs(1, 2)"), Err(ExprError::Arity { .. })));
    }

    #[test]
    fn test_missing_and_empty_fields_are_zero() {
        assert_eq!(eval_str("unknown + blank").unwrap(), ExprValue::Num(Decimal::ZERO));
    }

    #[test]
    fn test_runtime_errors() {
        assert_eq!(eval_str("capital / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(
            eval_str("raison_sociale > 1"),
            Err(ExprError::NonNumericField("raison_sociale".into()))
        );
        assert!(matches!(eval_str("is_listed + 1"), Err(ExprError::TypeMismatch(_))));
    }

    #[test]
    fn test_short_circuit_skips_errors() {
        assert_eq!(eval_str("false && capital / 0 > 1").unwrap(), ExprValue::Bool(false));
        assert_eq!(eval_str("true || raison_sociale > 1").unwrap(), ExprValue::Bool(true));
    }

    #[test]
    fn test_fields_listed_once() {
        let expr = Expression::parse("capital + capital > total_actif").unwrap();
        assert_eq!(expr.fields(), vec!["capital", "total_actif"]);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ExprError::UnexpectedEnd.error_code(), "EXPR_SYNTAX");
        assert_eq!(ExprError::DivisionByZero.error_code(), "EXPR_DIVISION_BY_ZERO");
    }
}
