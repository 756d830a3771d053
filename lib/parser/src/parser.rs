use ast::{BinaryExpr, Expr, GroupingExpr, LiteralExpr, UnaryExpr};
use errors::ErrorReporter;
use scanner::{Token, TokenType};
use value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    #[error("Expected expression.")]
    ExpectedExpression,
    #[error("Expect ')' after expression.")]
    MissingRightParen,
    #[error("Expect end of expression.")]
    ExpectedEnd,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct ParseError {
    pub error: ParseErrorType,
    pub token: Token,
}

pub type Result<T> = std::result::Result<T, ParseError>;

/// Recursive-descent parser. Each precedence level is one method, lowest precedence first:
///
/// ```text
/// expression → equality
/// equality   → comparison ( ( "!=" | "==" ) comparison )*
/// comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )*
/// term       → factor ( ( "-" | "+" ) factor )*
/// factor     → unary ( ( "/" | "*" ) unary )*
/// unary      → ( "!" | "-" ) unary | primary
/// primary    → NUMBER | STRING | "true" | "false" | "nil" | "(" expression ")"
/// ```
pub struct Parser<'r> {
    tokens: Vec<Token>,
    current: usize,
    reporter: &'r mut dyn ErrorReporter,
}

/// Parses `tokens` into a single expression, reporting syntax errors into `reporter`.
pub fn parse(tokens: Vec<Token>, reporter: &mut dyn ErrorReporter) -> Option<Expr> {
    Parser::new(tokens, reporter).parse()
}

impl<'r> Parser<'r> {
    pub fn new(mut tokens: Vec<Token>, reporter: &'r mut dyn ErrorReporter) -> Self {
        if tokens.last().map(Token::token_type) != Some(TokenType::Eof) {
            let line = tokens.last().map(Token::line).unwrap_or_default();
            tokens.push(Token::eof(line));
        }
        Self { tokens, current: 0, reporter }
    }

    /// Returns `None` if the tokens don't form exactly one expression. The error has been
    /// reported by then.
    pub fn parse(&mut self) -> Option<Expr> {
        match self.expression().and_then(|expr| self.end(expr)) {
            Ok(expr) => Some(expr),
            Err(e) => {
                log::trace!("Parse failed at {:?}: {}", e.token, e);
                None
            }
        }
    }

    /// Skips tokens until the start of what is probably the next statement.
    pub fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().token_type() == TokenType::Semicolon {
                return;
            }

            match self.peek().token_type() {
                TokenType::Class
                | TokenType::Fun
                | TokenType::Var
                | TokenType::For
                | TokenType::If
                | TokenType::While
                | TokenType::Print
                | TokenType::Return => return,
                _ => {}
            }

            log::trace!("Syncing past {:?}", self.peek());
            self.advance();
        }
    }

    fn end(&mut self, expr: Expr) -> Result<Expr> {
        if self.is_at_end() {
            Ok(expr)
        } else {
            Err(self.error(self.peek().clone(), ParseErrorType::ExpectedEnd))
        }
    }

    fn expression(&mut self) -> Result<Expr> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut expr = self.comparison()?;

        while let Some(operator) = self.match_any(&[TokenType::BangEqual, TokenType::EqualEqual]) {
            let right = self.comparison()?;
            expr = BinaryExpr::new(Box::new(expr), operator, Box::new(right)).into();
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let mut expr = self.term()?;

        while let Some(operator) = self.match_any(&[
            TokenType::Greater,
            TokenType::GreaterEqual,
            TokenType::Less,
            TokenType::LessEqual,
        ]) {
            let right = self.term()?;
            expr = BinaryExpr::new(Box::new(expr), operator, Box::new(right)).into();
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr> {
        let mut expr = self.factor()?;

        while let Some(operator) = self.match_any(&[TokenType::Minus, TokenType::Plus]) {
            let right = self.factor()?;
            expr = BinaryExpr::new(Box::new(expr), operator, Box::new(right)).into();
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr> {
        let mut expr = self.unary()?;

        while let Some(operator) = self.match_any(&[TokenType::Slash, TokenType::Star]) {
            let right = self.unary()?;
            expr = BinaryExpr::new(Box::new(expr), operator, Box::new(right)).into();
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr> {
        if let Some(operator) = self.match_any(&[TokenType::Bang, TokenType::Minus]) {
            let operand = self.unary()?;
            return Ok(UnaryExpr::new(operator, Box::new(operand)).into());
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr> {
        let literal = match self.peek().token_type() {
            TokenType::False => Value::Bool(false),
            TokenType::True => Value::Bool(true),
            TokenType::Nil => Value::Nil,
            TokenType::Number | TokenType::String => {
                self.peek().literal().cloned().unwrap_or_default()
            }
            TokenType::LeftParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenType::RightParen, ParseErrorType::MissingRightParen)?;
                return Ok(GroupingExpr::new(Box::new(expr)).into());
            }
            _ => return Err(self.error(self.peek().clone(), ParseErrorType::ExpectedExpression)),
        };

        self.advance();
        Ok(LiteralExpr::new(literal).into())
    }
}

// Helpers
impl<'r> Parser<'r> {
    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().token_type() == TokenType::Eof
    }

    fn check(&self, token_type: TokenType) -> bool {
        !self.is_at_end() && self.peek().token_type() == token_type
    }

    /// Never moves past the final `Eof`.
    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous().clone()
    }

    fn match_any(&mut self, token_types: &[TokenType]) -> Option<Token> {
        token_types.iter().any(|t| self.check(*t)).then(|| self.advance())
    }

    fn consume(&mut self, token_type: TokenType, error: ParseErrorType) -> Result<Token> {
        if self.check(token_type) {
            Ok(self.advance())
        } else {
            Err(self.error(self.peek().clone(), error))
        }
    }

    /// Reports the error right away and hands it back for unwinding.
    fn error(&mut self, token: Token, error: ParseErrorType) -> ParseError {
        self.reporter.error_at(token.line(), token.location(), &error.to_string());
        ParseError { error, token }
    }
}

#[cfg(test)]
mod tests {
    use ast::AstPrinter;
    use cursor::Line;
    use errors::{Diagnostic, ErrorKind, Location, Reporter};
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse_source(source: &str, reporter: &mut Reporter) -> Option<Expr> {
        let tokens = scanner::scan(source, reporter);
        assert!(!reporter.had_error(), "Unexpected scan errors: {}", reporter);
        parse(tokens, reporter)
    }

    fn print(source: &str) -> String {
        let mut reporter = Reporter::new();
        let expr = parse_source(source, &mut reporter);
        assert!(reporter.is_empty(), "Unexpected errors: {}", reporter);
        AstPrinter.print(&expr.unwrap())
    }

    fn parse_error(source: &str) -> Vec<Diagnostic> {
        let mut reporter = Reporter::new();
        assert_eq!(parse_source(source, &mut reporter), None);
        reporter.take()
    }

    fn syntax(line: usize, location: Location, error: ParseErrorType) -> Diagnostic {
        Diagnostic::new(ErrorKind::Syntax, Line(line), location, error)
    }

    #[test]
    fn literals() {
        assert_eq!(print("123"), "123");
        assert_eq!(print("\"hi\""), "hi");
        assert_eq!(print("true"), "true");
        assert_eq!(print("false"), "false");
        assert_eq!(print("nil"), "nil");
    }

    #[test]
    fn precedence() {
        assert_eq!(print("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(print("1 * 2 + 3"), "(+ (* 1 2) 3)");
        assert_eq!(print("1 + 2 < 3 == true"), "(== (< (+ 1 2) 3) true)");
        assert_eq!(print("-1 * 2"), "(* (- 1) 2)");
    }

    #[test]
    fn binary_operators_are_left_associative() {
        assert_eq!(print("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(print("8 / 4 / 2"), "(/ (/ 8 4) 2)");
        assert_eq!(print("1 == 2 != 3"), "(!= (== 1 2) 3)");
    }

    #[test]
    fn unary_is_right_associative() {
        assert_eq!(print("!!true"), "(! (! true))");
        assert_eq!(print("- -1"), "(- (- 1))");
    }

    #[test]
    fn comparison_operators() {
        assert_eq!(print("1 > 2"), "(> 1 2)");
        assert_eq!(print("1 >= 2"), "(>= 1 2)");
        assert_eq!(print("1 < 2"), "(< 1 2)");
        assert_eq!(print("1 <= 2"), "(<= 1 2)");
    }

    #[test]
    fn grouping() {
        assert_eq!(print("(1 + 2) * 3"), "(* (group (+ 1 2)) 3)");
        assert_eq!(print("((1))"), "(group (group 1))");
    }

    #[test]
    fn missing_right_paren() {
        assert_eq!(
            parse_error("(1 + 2"),
            vec![syntax(1, Location::AtEnd, ParseErrorType::MissingRightParen)]
        );
        assert_eq!(
            parse_error("(1 2)"),
            vec![syntax(1, Location::At("2".into()), ParseErrorType::MissingRightParen)]
        );
    }

    #[test]
    fn expected_expression() {
        assert_eq!(
            parse_error(""),
            vec![syntax(1, Location::AtEnd, ParseErrorType::ExpectedExpression)]
        );
        assert_eq!(
            parse_error("1 +\n)"),
            vec![syntax(2, Location::At(")".into()), ParseErrorType::ExpectedExpression)]
        );
        assert_eq!(
            parse_error("1 + foo"),
            vec![syntax(1, Location::At("foo".into()), ParseErrorType::ExpectedExpression)]
        );
    }

    #[test]
    fn left_brace_is_not_a_comparison() {
        assert_eq!(
            parse_error("1 { 2"),
            vec![syntax(1, Location::At("{".into()), ParseErrorType::ExpectedEnd)]
        );
    }

    #[test]
    fn trailing_tokens() {
        assert_eq!(
            parse_error("1 2"),
            vec![syntax(1, Location::At("2".into()), ParseErrorType::ExpectedEnd)]
        );
    }

    #[test]
    fn error_rendering() {
        assert_eq!(
            parse_error("(1")[0].to_string(),
            "[line 1] Error at end: Expect ')' after expression."
        );
        assert_eq!(parse_error("*")[0].to_string(), "[line 1] Error at '*': Expected expression.");
    }

    #[test]
    fn missing_eof_is_added() {
        let mut reporter = Reporter::new();
        let tokens = vec![Token::new(TokenType::Number, "1", Some(1.0.into()), Line(3))];

        let mut parser = Parser::new(tokens, &mut reporter);
        assert_eq!(parser.tokens.last(), Some(&Token::eof(Line(3))));
        assert_eq!(parser.parse().map(|e| AstPrinter.print(&e)), Some("1".to_string()));
    }

    #[test]
    fn synchronize_stops_after_semicolon() {
        let mut reporter = Reporter::new();
        let tokens = scanner::scan("+ 1 ; 2", &mut reporter);
        let mut parser = Parser::new(tokens, &mut reporter);

        parser.synchronize();

        assert_eq!(parser.peek().lexeme(), "2");
        assert_eq!(parser.parse().map(|e| AstPrinter.print(&e)), Some("2".to_string()));
    }

    #[test]
    fn synchronize_stops_before_keyword() {
        let mut reporter = Reporter::new();
        let tokens = scanner::scan("1 2 var x", &mut reporter);
        let mut parser = Parser::new(tokens, &mut reporter);

        parser.synchronize();

        assert_eq!(parser.peek().token_type(), TokenType::Var);
    }

    #[test]
    fn synchronize_stops_at_eof() {
        let mut reporter = Reporter::new();
        let tokens = scanner::scan("1 2 3", &mut reporter);
        let mut parser = Parser::new(tokens, &mut reporter);

        parser.synchronize();

        assert!(parser.is_at_end());
        parser.synchronize();
        assert!(parser.is_at_end());
    }
}
