use std::fmt::{self, Display};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Nil,
    Number(i64),
    String(String),
}

impl Value {
    pub(crate) fn is_truthy(&self) -> bool {
        use Value::*;
        match self {
            Bool(b) => *b,
            Nil => false,
            _ => true,
        }
    }

    pub(crate) fn type_name(&self) -> &'static str {
        use Value::*;
        match self {
            Bool(_) => "boolean",
            Nil => "nil",
            Number(_) => "number",
            String(_) => "string",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Value::*;
        match self {
            Bool(b) => write!(f, "{}", b),
            Nil => write!(f, "nil"),
            Number(n) => write!(f, "{}", n),
            String(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_and_false_are_the_only_falsy_values() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0).is_truthy());
        assert!(Value::String("".into()).is_truthy());
    }

    #[test]
    fn display_matches_source_spelling() {
        assert_eq!("nil", Value::Nil.to_string());
        assert_eq!("true", Value::Bool(true).to_string());
        assert_eq!("-42", Value::Number(-42).to_string());
        assert_eq!("hello world", Value::from("hello world").to_string());
    }
}
