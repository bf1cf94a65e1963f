use crate::{
    expr::Expr,
    stmt::Stmt,
};

/// Renders an expression as a parenthesised prefix form, e.g. `(+ 1 (* 2 3))`.
pub fn print(e: &Expr) -> String {
    let mut printer = AstPrinter {};
    printer.expr(e)
}

pub fn print_stmt(s: &Stmt) -> String {
    let mut printer = AstPrinter {};
    printer.stmt(s)
}

struct AstPrinter;

impl AstPrinter {
    fn parenthesize(&mut self, name: &str, exprs: &[&Expr]) -> String {
        let mut s = String::new();
        s.push('(');
        s.push_str(name);

        for e in exprs.iter() {
            s.push(' ');
            s.push_str(self.expr(e).as_str());
        }

        s.push(')');
        s
    }

    fn expr(&mut self, e: &Expr) -> String {
        match e {
            Expr::Assign(a) => {
                let name = format!("= {}", a.name.lexeme);
                self.parenthesize(&name, &[a.value.as_ref()])
            },
            Expr::Binary(b) => self.parenthesize(
                b.op.lexeme.as_str(),
                &[b.left.as_ref(), b.right.as_ref()]
            ),
            Expr::Grouping(g) => self.parenthesize("group", &[g.expression.as_ref()]),
            Expr::Logical(l) => self.parenthesize(
                l.op.lexeme.as_str(),
                &[l.left.as_ref(), l.right.as_ref()]
            ),
            Expr::Primary(p) => p.value.to_string(),
            Expr::Unary(u) => self.parenthesize(u.op.lexeme.as_str(), &[u.right.as_ref()]),
            Expr::Variable(v) => v.name.lexeme.clone(),
        }
    }

    fn stmt(&mut self, s: &Stmt) -> String {
        match s {
            Stmt::Block(b) => {
                let inner: Vec<_> = b.statements.iter().map(|s| self.stmt(s)).collect();
                if inner.is_empty() {
                    "(block)".to_string()
                } else {
                    format!("(block {})", inner.join(" "))
                }
            },
            Stmt::Expression(e) => self.parenthesize(";", &[&e.expression]),
            Stmt::Print(p) => self.parenthesize("print", &[&p.expression]),
            Stmt::Var(v) => {
                let name = format!("var {}", v.name.lexeme);
                match &v.initializer {
                    Some(initializer) => self.parenthesize(&name, &[initializer]),
                    None => self.parenthesize(&name, &[]),
                }
            },
        }
    }
}
