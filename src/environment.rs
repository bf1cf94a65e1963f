use std::{
    cell::RefCell,
    collections::HashMap,
    rc::Rc,
};
use log::debug;
use crate::{
    error::{Error, Result},
    token::Token,
    value::Value,
};

/// One scope of name bindings. Lookups and assignments fall back to the
/// enclosing scope; definitions never do.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Environment {
    enclosing: Option<Rc<RefCell<Environment>>>,
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self { enclosing: None, values: HashMap::new() }
    }

    pub fn from(e: &Rc<RefCell<Environment>>) -> Self {
        Self { enclosing: Some(Rc::clone(e)), values: HashMap::new() }
    }

    pub fn get(&self, name: &Token) -> Result<Value> {
        self.values.get(&name.lexeme)
            .map(|v| Ok(v.clone()))
            .unwrap_or_else(|| {
                self.enclosing.as_ref()
                    .map(|e| e.borrow().get(name))
                    .unwrap_or_else(|| Err(undefined_var_error(name)))
            })
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        match self.values.get_mut(&name.lexeme) {
            Some(v) => {
                *v = value;
                Ok(())
            },
            None => self.enclosing.as_ref()
                .map(|e| e.borrow_mut().assign(name, value))
                .unwrap_or_else(|| Err(undefined_var_error(name))),
        }
    }

    pub fn define<S: Into<String>>(&mut self, name: S, value: Value) {
        let name = name.into();
        debug!("define {} = {}", name, value);
        self.values.insert(name, value);
    }
}

fn undefined_var_error(name: &Token) -> Error {
    Error::runtime(
        name.clone(),
        format!("undefined variable: {}", name.lexeme)
    )
}
