use crate::{BinaryExpr, Expr, GroupingExpr, LiteralExpr, UnaryExpr, Visitor};

/// Renders a tree as a parenthesized prefix string, e.g. `(* (- 1) (group 2))`.
#[derive(Debug, Default)]
pub struct AstPrinter;

impl AstPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut output = format!("({name}");
        for expr in exprs {
            output.push(' ');
            output.push_str(&expr.accept(self));
        }
        output.push(')');
        output
    }
}

impl Visitor<String> for AstPrinter {
    fn visit_binary_expr(&mut self, expr: &BinaryExpr) -> String {
        self.parenthesize(expr.operator().lexeme(), &[expr.left(), expr.right()])
    }

    fn visit_grouping_expr(&mut self, expr: &GroupingExpr) -> String {
        self.parenthesize("group", &[expr.inner()])
    }

    fn visit_literal_expr(&mut self, expr: &LiteralExpr) -> String {
        expr.value().to_string()
    }

    fn visit_unary_expr(&mut self, expr: &UnaryExpr) -> String {
        self.parenthesize(expr.operator().lexeme(), &[expr.operand()])
    }
}
