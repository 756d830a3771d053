use std::fmt::Display;

use cursor::Line;
use errors::Location;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    token_type: TokenType,
    lexeme: String,
    literal: Option<Value>,
    line: Line,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        lexeme: impl Into<String>,
        literal: Option<Value>,
        line: Line,
    ) -> Self {
        Self { token_type, lexeme: lexeme.into(), literal, line }
    }

    pub fn eof(line: Line) -> Self {
        Self::new(TokenType::Eof, "", None, line)
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn literal(&self) -> Option<&Value> {
        self.literal.as_ref()
    }

    pub fn line(&self) -> Line {
        self.line
    }

    /// How an error at this token is located for the reporter.
    pub fn location(&self) -> Location {
        match self.token_type {
            TokenType::Eof => Location::AtEnd,
            _ => Location::At(self.lexeme.clone()),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
pub enum TokenType {
    /// Only ever returned by a keyword lookup that didn't match. Never ends up in a token.
    Undefined,

    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,

    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,

    // Literals.
    Identifier,
    String,
    Number,

    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof,
}

impl TokenType {
    /// Resolves a reserved word, or `Undefined` if `text` isn't one.
    pub fn keyword(text: &str) -> TokenType {
        text.parse::<Keyword>().map(TokenType::from).unwrap_or(TokenType::Undefined)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Keyword {
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,
}

impl From<Keyword> for TokenType {
    fn from(keyword: Keyword) -> Self {
        match keyword {
            Keyword::And => TokenType::And,
            Keyword::Class => TokenType::Class,
            Keyword::Else => TokenType::Else,
            Keyword::False => TokenType::False,
            Keyword::Fun => TokenType::Fun,
            Keyword::For => TokenType::For,
            Keyword::If => TokenType::If,
            Keyword::Nil => TokenType::Nil,
            Keyword::Or => TokenType::Or,
            Keyword::Print => TokenType::Print,
            Keyword::Return => TokenType::Return,
            Keyword::Super => TokenType::Super,
            Keyword::This => TokenType::This,
            Keyword::True => TokenType::True,
            Keyword::Var => TokenType::Var,
            Keyword::While => TokenType::While,
        }
    }
}
