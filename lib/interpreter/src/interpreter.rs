use ast::{BinaryExpr, Expr, GroupingExpr, LiteralExpr, UnaryExpr, Visitor};
use errors::ErrorReporter;
use scanner::{Token, TokenType};
use value::Value;

mod pipeline;
pub use pipeline::{parse_source, run_source};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be a number.")]
    OperandsMustBeNumbers,
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustBeNumbersOrStrings,
}

/// A type error during evaluation, tied to the operator that caused it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub token: Token,
}

impl RuntimeError {
    fn new(error: RuntimeErrorType, token: &Token) -> Self {
        Self { error, token: token.clone() }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Evaluates expression trees bottom-up.
#[derive(Debug, Default)]
pub struct Interpreter;

impl Interpreter {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `expr` and renders the result, or reports the runtime error and returns `None`.
    pub fn interpret(&mut self, expr: &Expr, reporter: &mut dyn ErrorReporter) -> Option<String> {
        match self.evaluate(expr) {
            Ok(value) => Some(value.to_string()),
            Err(e) => {
                log::debug!("Runtime error at {:?}: {}", e.token, e);
                reporter.runtime_error(e.token.line(), &e.to_string());
                None
            }
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> Result<Value> {
        expr.accept(self)
    }
}

fn numeric(
    operator: &Token,
    left: &Value,
    right: &Value,
    op: impl Fn(f64, f64) -> Value,
) -> Result<Value> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok(op(*l, *r)),
        _ => Err(RuntimeError::new(RuntimeErrorType::OperandsMustBeNumbers, operator)),
    }
}

impl Visitor<Result<Value>> for Interpreter {
    fn visit_binary_expr(&mut self, expr: &BinaryExpr) -> Result<Value> {
        // Right operand first
        let right = self.evaluate(expr.right())?;
        let left = self.evaluate(expr.left())?;
        let operator = expr.operator();

        match operator.token_type() {
            TokenType::EqualEqual => Ok(left.is_equal(&right).into()),
            TokenType::BangEqual => Ok((!left.is_equal(&right)).into()),

            TokenType::Plus => match (left, right) {
                (Value::Number(l), Value::Number(r)) => Ok((l + r).into()),
                (Value::Str(l), Value::Str(r)) => Ok((l + &r).into()),
                _ => Err(RuntimeError::new(
                    RuntimeErrorType::OperandsMustBeNumbersOrStrings,
                    operator,
                )),
            },
            TokenType::Minus => numeric(operator, &left, &right, |l, r| (l - r).into()),
            // Division by zero is IEEE 754 division, not an error
            TokenType::Slash => numeric(operator, &left, &right, |l, r| (l / r).into()),
            TokenType::Star => numeric(operator, &left, &right, |l, r| (l * r).into()),

            TokenType::Greater => numeric(operator, &left, &right, |l, r| (l > r).into()),
            TokenType::GreaterEqual => numeric(operator, &left, &right, |l, r| (l >= r).into()),
            TokenType::Less => numeric(operator, &left, &right, |l, r| (l < r).into()),
            TokenType::LessEqual => numeric(operator, &left, &right, |l, r| (l <= r).into()),

            t => unreachable!("Invalid binary operator: {t}"),
        }
    }

    fn visit_grouping_expr(&mut self, expr: &GroupingExpr) -> Result<Value> {
        self.evaluate(expr.inner())
    }

    fn visit_literal_expr(&mut self, expr: &LiteralExpr) -> Result<Value> {
        Ok(expr.value().clone())
    }

    fn visit_unary_expr(&mut self, expr: &UnaryExpr) -> Result<Value> {
        let operand = self.evaluate(expr.operand())?;

        match (expr.operator().token_type(), operand) {
            (TokenType::Minus, Value::Number(n)) => Ok((-n).into()),
            (TokenType::Minus, _) => {
                Err(RuntimeError::new(RuntimeErrorType::OperandMustBeNumber, expr.operator()))
            }
            (TokenType::Bang, v) => Ok((!v.is_truthy()).into()),
            (t, _) => unreachable!("Invalid unary operator: {t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use cursor::Line;
    use errors::Reporter;
    use pretty_assertions::assert_eq;

    use super::*;

    fn evaluate(source: &str) -> Result<Value> {
        let mut reporter = Reporter::new();
        let expr = parse_source(source, &mut reporter).unwrap();
        Interpreter::new().evaluate(&expr)
    }

    fn runtime_error(error: RuntimeErrorType, token_type: TokenType, lexeme: &str) -> RuntimeError {
        RuntimeError { error, token: Token::new(token_type, lexeme, None, Line(1)) }
    }

    #[test]
    fn arithmetic() {
        assert_eq!(evaluate("1 + 2 * 3"), Ok(Value::Number(7.0)));
        assert_eq!(evaluate("(1 + 2) * 3"), Ok(Value::Number(9.0)));
        assert_eq!(evaluate("10 - 4 - 3"), Ok(Value::Number(3.0)));
        assert_eq!(evaluate("8 / 4 / 2"), Ok(Value::Number(1.0)));
        assert_eq!(evaluate("-(2 * 3)"), Ok(Value::Number(-6.0)));
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(evaluate("1 / 0"), Ok(Value::Number(f64::INFINITY)));
        assert_eq!(evaluate("-1 / 0"), Ok(Value::Number(f64::NEG_INFINITY)));
        assert!(matches!(evaluate("0 / 0"), Ok(Value::Number(n)) if n.is_nan()));
    }

    #[test]
    fn comparison() {
        assert_eq!(evaluate("1 < 2"), Ok(Value::Bool(true)));
        assert_eq!(evaluate("2 <= 2"), Ok(Value::Bool(true)));
        assert_eq!(evaluate("1 > 2"), Ok(Value::Bool(false)));
        assert_eq!(evaluate("3 >= 2"), Ok(Value::Bool(true)));
    }

    #[test]
    fn equality() {
        assert_eq!(evaluate("\"a\" == \"a\""), Ok(Value::Bool(true)));
        assert_eq!(evaluate("nil == false"), Ok(Value::Bool(false)));
        assert_eq!(evaluate("nil == nil"), Ok(Value::Bool(true)));
        assert_eq!(evaluate("1 == \"1\""), Ok(Value::Bool(false)));
        assert_eq!(evaluate("1 != 2"), Ok(Value::Bool(true)));
        assert_eq!(evaluate("true != true"), Ok(Value::Bool(false)));
    }

    #[test]
    fn string_concatenation() {
        assert_eq!(evaluate("\"a\" + \"b\" + \"c\""), Ok(Value::from("abc")));
        assert_eq!(evaluate("\"a\" + (\"b\" + \"c\")"), Ok(Value::from("abc")));
    }

    #[test]
    fn truthiness() {
        assert_eq!(evaluate("!nil"), Ok(Value::Bool(true)));
        assert_eq!(evaluate("!false"), Ok(Value::Bool(true)));
        assert_eq!(evaluate("!0"), Ok(Value::Bool(false)));
        assert_eq!(evaluate("!\"\""), Ok(Value::Bool(false)));
        assert_eq!(evaluate("!!123"), Ok(Value::Bool(true)));
        assert_eq!(evaluate("!!nil"), Ok(Value::Bool(false)));
    }

    #[test]
    fn type_errors() {
        assert_eq!(
            evaluate("-\"a\""),
            Err(runtime_error(RuntimeErrorType::OperandMustBeNumber, TokenType::Minus, "-"))
        );
        assert_eq!(
            evaluate("\"a\" / 2"),
            Err(runtime_error(RuntimeErrorType::OperandsMustBeNumbers, TokenType::Slash, "/"))
        );
        assert_eq!(
            evaluate("1 < true"),
            Err(runtime_error(RuntimeErrorType::OperandsMustBeNumbers, TokenType::Less, "<"))
        );
        assert_eq!(
            evaluate("1 + \"a\""),
            Err(runtime_error(
                RuntimeErrorType::OperandsMustBeNumbersOrStrings,
                TokenType::Plus,
                "+"
            ))
        );
    }

    #[test]
    fn right_operand_is_evaluated_first() {
        // Both operands fail, the error comes from the right one
        let error = evaluate("(-nil) + (1 * \n \"a\")").unwrap_err();
        assert_eq!(error.token.token_type(), TokenType::Star);
        assert_eq!(error.token.line(), Line(1));
    }

    #[test]
    fn interpret_renders_values() {
        let mut reporter = Reporter::new();
        let expr = parse_source("nil", &mut reporter).unwrap();
        assert_eq!(Interpreter::new().interpret(&expr, &mut reporter), Some("nil".to_string()));

        let expr = parse_source("2.5 * 2", &mut reporter).unwrap();
        assert_eq!(Interpreter::new().interpret(&expr, &mut reporter), Some("5".to_string()));

        assert!(reporter.is_empty());
    }

    #[test]
    fn interpret_reports_runtime_errors() {
        let mut reporter = Reporter::new();
        let expr = parse_source("1 +\n\"a\" / 3", &mut reporter).unwrap();

        assert_eq!(Interpreter::new().interpret(&expr, &mut reporter), None);
        assert!(reporter.had_runtime_error());
        assert!(!reporter.had_error());
        assert_eq!(reporter.to_string(), "Operands must be a number.\n[line 2]");
    }
}
