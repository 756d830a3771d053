//! The expression grammar the `ast` crate's node model is generated from.

pub const EXPR_BASE_NAME: &str = "Expr";

pub const EXPR_USES: &[&str] = &["scanner::Token", "value::Value"];

pub const EXPR_RULES: &[&str] = &[
    "Binary   : Box<Expr> left, Token operator, Box<Expr> right",
    "Grouping : Box<Expr> inner",
    "Literal  : Value value",
    "Unary    : Token operator, Box<Expr> operand",
];
