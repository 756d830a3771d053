//! The expression tree and its visitors.
//!
//! `ast/expr.rs` is generated by `ast_generator`, edit the grammar there instead of the file.

mod ast {
    pub mod expr;
}
mod printer;

pub use ast::expr::*;
pub use printer::AstPrinter;
