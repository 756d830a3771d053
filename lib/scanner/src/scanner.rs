use cursor::{Cursor, Line};
use errors::ErrorReporter;
use value::Value;

pub mod token;
pub use token::{Keyword, Token, TokenType};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScanErrorType {
    #[error("Unexpected character: {0}")]
    UnexpectedCharacter(char),
    #[error("Unterminated string.")]
    UnterminatedString,
    #[error("Unterminated block comment.")]
    UnterminatedComment,
}

/// Turns source text into tokens in a single forward pass.
///
/// Lexical errors go to the reporter and scanning carries on, so the token list is always
/// complete and always ends in a single `Eof`.
pub struct Scanner<'a, 'r> {
    start: Cursor<'a>,
    current: Cursor<'a>,
    tokens: Vec<Token>,
    reporter: &'r mut dyn ErrorReporter,
}

/// Scans `source`, reporting lexical errors into `reporter`.
pub fn scan(source: &str, reporter: &mut dyn ErrorReporter) -> Vec<Token> {
    Scanner::new(source, reporter).scan_tokens()
}

impl<'a, 'r> Scanner<'a, 'r> {
    pub fn new(source: &'a str, reporter: &'r mut dyn ErrorReporter) -> Self {
        let cursor = Cursor::new(source);
        Self { start: cursor.clone(), current: cursor, tokens: Vec::new(), reporter }
    }

    pub fn scan_tokens(mut self) -> Vec<Token> {
        loop {
            self.start = self.current.clone();
            let Some(c) = self.current.next() else {
                break;
            };

            match c {
                '(' => self.add_token(TokenType::LeftParen),
                ')' => self.add_token(TokenType::RightParen),
                '{' => self.add_token(TokenType::LeftBrace),
                '}' => self.add_token(TokenType::RightBrace),
                ',' => self.add_token(TokenType::Comma),
                '.' => self.add_token(TokenType::Dot),
                '-' => self.add_token(TokenType::Minus),
                '+' => self.add_token(TokenType::Plus),
                ';' => self.add_token(TokenType::Semicolon),
                '*' => self.add_token(TokenType::Star),

                '!' => self.add_either('=', TokenType::BangEqual, TokenType::Bang),
                '=' => self.add_either('=', TokenType::EqualEqual, TokenType::Equal),
                '<' => self.add_either('=', TokenType::LessEqual, TokenType::Less),
                '>' => self.add_either('=', TokenType::GreaterEqual, TokenType::Greater),

                '/' => {
                    if self.current.consume_if('/') {
                        // Comment
                        self.current.consume_while(|c| c != '\n');
                    } else if self.current.consume_if('*') {
                        self.block_comment();
                    } else {
                        self.add_token(TokenType::Slash)
                    }
                }

                '"' => self.string(),

                d if d.is_ascii_digit() => self.number(),

                a if is_alpha(a) => self.identifier(),

                // Newlines are counted by the cursor
                ' ' | '\r' | '\t' | '\n' => (),

                c => self.error(self.current.line(), ScanErrorType::UnexpectedCharacter(c)),
            }
        }

        self.tokens.push(Token::eof(self.current.line()));
        self.tokens
    }

    fn lexeme(&self) -> &'a str {
        self.start.slice_until(&self.current)
    }

    fn add_token(&mut self, token_type: TokenType) {
        self.push_token(token_type, None)
    }

    fn add_either(&mut self, expected: char, matched: TokenType, otherwise: TokenType) {
        if self.current.consume_if(expected) {
            self.add_token(matched)
        } else {
            self.add_token(otherwise)
        }
    }

    fn push_token(&mut self, token_type: TokenType, literal: Option<Value>) {
        let token = Token::new(token_type, self.lexeme(), literal, self.start.line());
        log::trace!("Scanned {:?}", token);
        self.tokens.push(token);
    }

    fn error(&mut self, line: Line, error: ScanErrorType) {
        self.reporter.error(line, &error.to_string());
    }

    /// Block comments nest, so `/* /* */ */` is a single comment.
    fn block_comment(&mut self) {
        let mut depth = 1;
        loop {
            match self.current.next() {
                None => {
                    // Point at the opening `/*`, the end of the source is of little use
                    self.error(self.start.line(), ScanErrorType::UnterminatedComment);
                    return;
                }
                Some('/') if self.current.consume_if('*') => depth += 1,
                Some('*') if self.current.consume_if('/') => {
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                }
                Some(_) => (),
            }
        }
    }

    fn string(&mut self) {
        self.current.consume_while(|c| c != '"');

        if !self.current.consume_if('"') {
            self.error(self.current.line(), ScanErrorType::UnterminatedString);
            return;
        }

        let lexeme = self.lexeme();
        let value = &lexeme[1..lexeme.len() - 1];
        self.push_token(TokenType::String, Some(value.into()))
    }

    fn number(&mut self) {
        self.current.consume_while(|c| c.is_ascii_digit());

        // A trailing `.` without digits after it isn't part of the number
        if self.current.peek() == Some('.')
            && self.current.peek_next().is_some_and(|c| c.is_ascii_digit())
        {
            self.current.next();
            self.current.consume_while(|c| c.is_ascii_digit());
        }

        match self.lexeme().parse::<f64>() {
            Ok(n) => self.push_token(TokenType::Number, Some(n.into())),
            Err(e) => log::error!("Failed to parse number {:?}: {e}", self.lexeme()),
        }
    }

    fn identifier(&mut self) {
        self.current.consume_while(|c| is_alpha(c) || c.is_ascii_digit());

        match TokenType::keyword(self.lexeme()) {
            TokenType::Undefined => self.add_token(TokenType::Identifier),
            keyword => self.add_token(keyword),
        }
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
