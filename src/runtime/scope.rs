//! Lexical scopes for the evaluator.

use std::collections::HashMap;

use crate::errors::ErrorKind;
use crate::runtime::Value;

/// A stack of variable frames, innermost last.
#[derive(Debug)]
pub struct Scopes {
    frames: Vec<HashMap<String, Value>>,
}

impl Scopes {
    /// A stack holding one empty global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Drops the innermost frame. The global frame is never dropped.
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Binds `name` in the innermost frame.
    pub fn declare(&mut self, name: &str, value: Value) -> Result<(), ErrorKind> {
        let innermost = self.frames.len() - 1;
        let frame = &mut self.frames[innermost];
        if frame.contains_key(name) {
            return Err(ErrorKind::Redeclaration {
                symbol: name.to_string(),
            });
        }
        frame.insert(name.to_string(), value);
        Ok(())
    }

    /// Rebinds the nearest existing `name`.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), ErrorKind> {
        match self.frames.iter_mut().rev().find_map(|f| f.get_mut(name)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ErrorKind::UndeclaredAssignment {
                symbol: name.to_string(),
            }),
        }
    }

    pub fn get(&self, name: &str) -> Result<&Value, ErrorKind> {
        self.frames
            .iter()
            .rev()
            .find_map(|f| f.get(name))
            .ok_or_else(|| ErrorKind::UndefinedSymbol {
                symbol: name.to_string(),
            })
    }
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}
