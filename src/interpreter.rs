use std::{
    cell::RefCell,
    io::Write,
    rc::Rc,
};

use log::trace;

use crate::{
    environment::Environment,
    error::{Error, Result},
    expr::{self, Expr},
    stmt::{self, Stmt},
    token::{TokenKind, Token},
    value::Value,
};

/// Evaluates statements against a global environment, writing the output of
/// `print` statements to `writer`.
pub struct Interpreter<W> {
    environment: Rc<RefCell<Environment>>,
    writer: W,
}

impl <W: Write> Interpreter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_environment(writer, Rc::new(RefCell::new(Environment::new())))
    }

    pub fn with_environment(writer: W, environment: Rc<RefCell<Environment>>) -> Self {
        Interpreter { environment, writer }
    }

    pub fn environment(&self) -> &Rc<RefCell<Environment>> {
        &self.environment
    }

    /// Runs `statements` in order. The first runtime error stops execution and
    /// is returned; statements before it keep their effects.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        trace!("interpreting {} statements", statements.len());
        for s in statements.iter() {
            self.execute(s)?;
        }
        Ok(())
    }

    fn execute(&mut self, s: &Stmt) -> Result<()> {
        match s {
            Stmt::Block(b) => self.execute_block(b),
            Stmt::Expression(e) => self.execute_expression(e),
            Stmt::Print(p) => self.execute_print(p),
            Stmt::Var(v) => self.execute_var(v),
        }
    }

    fn execute_block(&mut self, b: &stmt::Block) -> Result<()> {
        Err(Error::runtime(b.brace.clone(), "block statements are not supported"))
    }

    fn execute_expression(&mut self, e: &stmt::Expression) -> Result<()> {
        self.evaluate(&e.expression)?;
        Ok(())
    }

    fn execute_print(&mut self, p: &stmt::Print) -> Result<()> {
        let value = self.evaluate(&p.expression)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    fn execute_var(&mut self, v: &stmt::Var) -> Result<()> {
        let value = if let Some(initializer) = &v.initializer {
            self.evaluate(initializer)?
        } else {
            Value::Nil
        };

        self.environment.borrow_mut().define(v.name.lexeme.clone(), value);
        Ok(())
    }

    pub(crate) fn evaluate(&mut self, e: &Expr) -> Result<Value> {
        match e {
            Expr::Assign(a) => self.evaluate_assign(a),
            Expr::Binary(b) => self.evaluate_binary(b),
            Expr::Grouping(g) => self.evaluate(&g.expression),
            Expr::Logical(l) => self.evaluate_logical(l),
            Expr::Primary(p) => Ok(p.value.clone()),
            Expr::Unary(u) => self.evaluate_unary(u),
            Expr::Variable(v) => self.environment.borrow().get(&v.name),
        }
    }

    // Assignment is an expression but yields nil, not the assigned value.
    fn evaluate_assign(&mut self, a: &expr::Assign) -> Result<Value> {
        let value = self.evaluate(&a.value)?;
        self.environment.borrow_mut().assign(&a.name, value)?;
        Ok(Value::Nil)
    }

    fn evaluate_binary(&mut self, e: &expr::Binary) -> Result<Value> {
        let left = self.evaluate(e.left.as_ref())?;
        let right = self.evaluate(e.right.as_ref())?;

        use Value::{Number, String};
        match e.op.kind {
            TokenKind::Minus => checked_if_numbers(&e.op, left, right, i64::checked_sub),
            TokenKind::Plus => match (left, right) {
                (Number(l), Number(r)) => checked(&e.op, l.checked_add(r)),
                (String(mut l), String(r)) => {
                    l.push_str(r.as_str());
                    Ok(String(l))
                },
                _ => Err(Error::runtime(
                    e.op.clone(),
                    "operands must both be a numbers or strings for add operation"
                )),
            },
            TokenKind::Slash => {
                if right == Number(0) && matches!(left, Number(_)) {
                    return Err(Error::runtime(e.op.clone(), "cannot perform division by zero"))
                }
                checked_if_numbers(&e.op, left, right, i64::checked_div)
            },
            TokenKind::Star => checked_if_numbers(&e.op, left, right, i64::checked_mul),
            TokenKind::Greater => compute_if_numbers(&e.op, left, right, |l, r| l > r),
            TokenKind::GreaterEqual => compute_if_numbers(&e.op, left, right, |l, r| l >= r),
            TokenKind::Less => compute_if_numbers(&e.op, left, right, |l, r| l < r),
            TokenKind::LessEqual => compute_if_numbers(&e.op, left, right, |l, r| l <= r),
            TokenKind::EqualEqual => Ok(Value::Bool(is_equal(&e.op, &left, &right)?)),
            TokenKind::BangEqual => Ok(Value::Bool(!is_equal(&e.op, &left, &right)?)),
            _ => Err(Error::runtime(e.op.clone(), format!("'{}' is not a binary operator", e.op.lexeme))),
        }
    }

    fn evaluate_logical(&mut self, e: &expr::Logical) -> Result<Value> {
        let left = self.evaluate(&e.left)?;

        use TokenKind::*;
        match (&e.op.kind, left.is_truthy()) {
            (Or, true) | (And, false) => Ok(left),
            (Or, false) | (And, true) => self.evaluate(&e.right),
            _ => Err(Error::runtime(e.op.clone(), format!("'{}' is not a logical operator", e.op.lexeme))),
        }
    }

    fn evaluate_unary(&mut self, e: &expr::Unary) -> Result<Value> {
        let right = self.evaluate(e.right.as_ref())?;

        use Value::*;
        match (&e.op.kind, right) {
            (TokenKind::Minus, Number(right)) => checked(&e.op, right.checked_neg()),
            (TokenKind::Minus, _) => Err(Error::runtime(e.op.clone(), "operand must be a number")),
            (TokenKind::Bang, right) => Ok(Bool(!right.is_truthy())),
            _ => Err(Error::runtime(e.op.clone(), format!("'{}' is not a unary operator", e.op.lexeme))),
        }
    }
}

fn compute_if_numbers<T: Into<Value>>(
    op: &Token,
    left: Value,
    right: Value,
    f: impl Fn(i64, i64) -> T
) -> Result<Value> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok(f(l, r).into()),
        _ => Err(operands_must_be_numbers(op)),
    }
}

fn checked_if_numbers(
    op: &Token,
    left: Value,
    right: Value,
    f: impl Fn(i64, i64) -> Option<i64>
) -> Result<Value> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => checked(op, f(l, r)),
        _ => Err(operands_must_be_numbers(op)),
    }
}

fn checked(op: &Token, result: Option<i64>) -> Result<Value> {
    result
        .map(Value::Number)
        .ok_or_else(|| Error::runtime(op.clone(), "integer overflow"))
}

fn operands_must_be_numbers(op: &Token) -> Error {
    Error::runtime(op.clone(), format!("operands must be numbers for '{}' operation", op.lexeme))
}

// Only numbers, booleans and strings compare, and only against their own type.
fn is_equal(op: &Token, left: &Value, right: &Value) -> Result<bool> {
    use Value::*;
    match (left, right) {
        (Number(l), Number(r)) => Ok(l == r),
        (Bool(l), Bool(r)) => Ok(l == r),
        (String(l), String(r)) => Ok(l == r),
        _ => Err(Error::runtime(
            op.clone(),
            format!(
                "operands must both be numbers, booleans or strings for equality operation, got {} and {}",
                left.type_name(),
                right.type_name()
            )
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::Parser, scanner::Scanner};
    use std::io;

    fn parse(src: &str) -> Result<Vec<Stmt>> {
        let tokens = Scanner::new(src).scan_tokens()?;
        Parser::new(tokens.into_iter()).parse()
    }

    fn run(src: &str) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = parse(src).and_then(|statements| {
            Interpreter::new(&mut out).interpret(&statements)
        });
        (result, String::from_utf8_lossy(&out).into_owned())
    }

    fn output_of(src: &str) -> io::Result<String> {
        let (result, out) = run(src);
        result?;
        Ok(out)
    }

    fn runtime_error_of(src: &str) -> Error {
        match run(src) {
            (Err(e), _) => {
                assert!(e.is_runtime_error(), "expected a runtime error, got {}", e);
                e
            },
            (Ok(()), out) => panic!("expected {:?} to fail, printed {:?}", src, out),
        }
    }

    fn eval(src: &str) -> io::Result<Value> {
        let tokens = Scanner::new(src).scan_tokens()?;
        let mut parser = Parser::new(tokens.into_iter());
        let statements = parser.parse()?;
        let mut interpreter = Interpreter::new(io::sink());
        match &statements[..] {
            [Stmt::Expression(e)] => Ok(interpreter.evaluate(&e.expression)?),
            _ => panic!("expected a single expression statement in {:?}", src),
        }
    }

    #[test]
    fn primaries_evaluate_to_themselves() -> io::Result<()> {
        assert_eq!(Value::Number(1), eval("1;")?);
        assert_eq!(Value::Nil, eval("nil;")?);
        assert_eq!(Value::from("test"), eval("\"test\";")?);
        assert_eq!(Value::Bool(false), eval("false;")?);
        Ok(())
    }

    #[test]
    fn groupings_evaluate_their_contents() -> io::Result<()> {
        assert_eq!(Value::Number(9), eval("(1 + 2) * 3;")?);
        assert_eq!(Value::Number(7), eval("1 + 2 * 3;")?);
        Ok(())
    }

    #[test]
    fn arithmetic() -> io::Result<()> {
        assert_eq!(Value::Number(-4), eval("1 - 2 - 3;")?);
        assert_eq!(Value::Number(5), eval("10 / 2;")?);
        assert_eq!(Value::Number(3), eval("7 / 2;")?);
        assert_eq!(Value::Number(-6), eval("-(2 * 3);")?);
        Ok(())
    }

    #[test]
    fn string_concatenation() -> io::Result<()> {
        assert_eq!(Value::from("foobar"), eval("\"foo\" + \"bar\";")?);
        Ok(())
    }

    #[test]
    fn adding_a_number_to_a_string_is_an_error() {
        let e = runtime_error_of("3 + \"x\";");
        assert_eq!("operands must both be a numbers or strings for add operation", e.message());
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let e = runtime_error_of("10 / 0;");
        assert_eq!("cannot perform division by zero", e.message());
    }

    #[test]
    fn arithmetic_requires_numbers() {
        for src in ["true - 1;", "\"a\" * 2;", "nil / 1;", "1 < \"2\";", "false >= true;"].iter() {
            let e = runtime_error_of(src);
            assert!(e.message().starts_with("operands must be numbers"), "{}", e);
        }
    }

    #[test]
    fn overflow_is_an_error() {
        let e = runtime_error_of("9223372036854775807 + 1;");
        assert_eq!("integer overflow", e.message());
    }

    #[test]
    fn comparisons() -> io::Result<()> {
        assert_eq!(Value::Bool(true), eval("1 < 2;")?);
        assert_eq!(Value::Bool(true), eval("2 <= 2;")?);
        assert_eq!(Value::Bool(false), eval("1 > 2;")?);
        assert_eq!(Value::Bool(true), eval("3 >= 2;")?);
        Ok(())
    }

    #[test]
    fn equality_within_a_type() -> io::Result<()> {
        assert_eq!(Value::Bool(true), eval("1 == 1;")?);
        assert_eq!(Value::Bool(true), eval("\"a\" != \"b\";")?);
        assert_eq!(Value::Bool(true), eval("true == !false;")?);
        Ok(())
    }

    #[test]
    fn equality_across_types_is_an_error() {
        for src in ["1 == \"1\";", "true != 0;", "nil == nil;"].iter() {
            let e = runtime_error_of(src);
            assert!(e.message().starts_with("operands must both be numbers, booleans or strings"), "{}", e);
        }
    }

    #[test]
    fn unary_operators() -> io::Result<()> {
        assert_eq!(Value::Bool(true), eval("!nil;")?);
        assert_eq!(Value::Bool(false), eval("!0;")?);
        assert_eq!(Value::Bool(false), eval("!\"\";")?);
        assert_eq!(Value::Number(-3), eval("-3;")?);
        Ok(())
    }

    #[test]
    fn negating_a_non_number_is_an_error() {
        let e = runtime_error_of("-\"x\";");
        assert_eq!("operand must be a number", e.message());
    }

    #[test]
    fn logical_operators_return_an_operand() -> io::Result<()> {
        assert_eq!(Value::from("a"), eval("\"a\" or \"b\";")?);
        assert_eq!(Value::from("b"), eval("nil or \"b\";")?);
        assert_eq!(Value::Nil, eval("nil and \"b\";")?);
        assert_eq!(Value::from("b"), eval("1 and \"b\";")?);
        Ok(())
    }

    #[test]
    fn logical_operators_short_circuit() -> io::Result<()> {
        assert_eq!(Value::Bool(false), eval("false and (1/0 == 0);")?);
        assert_eq!(Value::Bool(true), eval("true or (1/0 == 0);")?);
        Ok(())
    }

    #[test]
    fn variables_and_assignment() -> io::Result<()> {
        assert_eq!("6\n", output_of("var x = 5; x = x + 1; print x;")?);
        assert_eq!("nil\n", output_of("var x; print x;")?);
        Ok(())
    }

    #[test]
    fn assignment_evaluates_to_nil() -> io::Result<()> {
        assert_eq!("nil\n5\n", output_of("var x; print x = 5; print x;")?);
        Ok(())
    }

    #[test]
    fn reading_an_undefined_variable_is_an_error() {
        let e = runtime_error_of("y;");
        assert_eq!("undefined variable: y", e.message());
    }

    #[test]
    fn assigning_an_undefined_variable_is_an_error() {
        let e = runtime_error_of("y = 1;");
        assert_eq!("undefined variable: y", e.message());
    }

    #[test]
    fn execution_stops_at_the_first_error() {
        let (result, out) = run("print 1; print y; print 2;");
        assert!(result.is_err());
        assert_eq!("1\n", out);
    }

    #[test]
    fn blocks_are_not_executed() {
        let brace = Token::new(TokenKind::LeftBrace, "{", 1);
        let mut interpreter = Interpreter::new(io::sink());
        let e = interpreter.interpret(&[Stmt::new_block(brace, vec![])]).unwrap_err();
        assert_eq!("block statements are not supported", e.message());
    }

    #[test]
    fn hand_built_nodes_with_foreign_operators_are_errors() {
        let op = || Token::new(TokenKind::Semicolon, ";", 3);
        let one = || Box::new(Expr::new_primary(Value::Number(1)));
        let mut interpreter = Interpreter::new(io::sink());

        let e = interpreter.evaluate(&Expr::new_binary(one(), op(), one())).unwrap_err();
        assert!(e.is_runtime_error());
        assert_eq!("';' is not a binary operator", e.message());

        let e = interpreter.evaluate(&Expr::new_logical(one(), op(), one())).unwrap_err();
        assert_eq!("';' is not a logical operator", e.message());

        let e = interpreter.evaluate(&Expr::new_unary(op(), one())).unwrap_err();
        assert_eq!("';' is not a unary operator", e.message());
    }

    #[test]
    fn interprets_against_a_supplied_environment() -> io::Result<()> {
        let globals = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define("greeting", Value::from("hi"));

        let mut out = Vec::new();
        let mut interpreter = Interpreter::with_environment(&mut out, Rc::clone(&globals));
        interpreter.interpret(&parse("var answer = 42; print greeting;")?)?;

        assert!(Rc::ptr_eq(&globals, interpreter.environment()));
        assert_eq!("hi\n", String::from_utf8_lossy(&out));
        let answer = Token::new(TokenKind::Identifier, "answer", 1);
        assert_eq!(Value::Number(42), globals.borrow().get(&answer)?);
        Ok(())
    }
}
