//! Key- and depth-filtered materialization of JSON sub-trees.

use json_event_parser::JsonEvent;
use serde_json::{Map, Value};

use crate::scan::scalar_value;

/// A materialized sub-tree together with the key it was found under.
#[derive(Debug, Clone, PartialEq)]
pub enum Selected {
    Object { key: String, value: Map<String, Value> },
    Array { key: String, value: Vec<Value> },
}

#[derive(Debug)]
enum Partial {
    Object {
        map: Map<String, Value>,
        key: Option<String>,
    },
    Array(Vec<Value>),
}

impl Partial {
    fn object() -> Self {
        Partial::Object {
            map: Map::new(),
            key: None,
        }
    }

    fn insert(&mut self, value: Value) {
        match self {
            Partial::Object { map, key } => {
                map.insert(key.take().unwrap_or_default(), value);
            }
            Partial::Array(items) => items.push(value),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Partial::Object { map, .. } => Value::Object(map),
            Partial::Array(items) => Value::Array(items),
        }
    }
}

#[derive(Debug)]
struct Capture {
    key: String,
    stack: Vec<Partial>,
}

impl Capture {
    /// Returns the finished value when the captured container closes.
    fn accept(&mut self, event: JsonEvent<'_>) -> Option<Value> {
        match event {
            JsonEvent::StartObject => self.stack.push(Partial::object()),
            JsonEvent::StartArray => self.stack.push(Partial::Array(Vec::new())),
            JsonEvent::ObjectKey(k) => {
                if let Some(Partial::Object { key, .. }) = self.stack.last_mut() {
                    *key = Some(k.into_owned());
                }
            }
            JsonEvent::EndObject | JsonEvent::EndArray => {
                let done = self.stack.pop()?.into_value();
                match self.stack.last_mut() {
                    Some(parent) => parent.insert(done),
                    None => return Some(done),
                }
            }
            scalar => {
                if let (Some(top), Some(value)) = (self.stack.last_mut(), scalar_value(&scalar)) {
                    top.insert(value);
                }
            }
        }
        None
    }
}

/// Turns a parser event stream into selected sub-trees.
///
/// `filter(key, depth)` decides whether the object or array following a key
/// is built in memory. Everything outside a selected sub-tree (including
/// scalar values of selected keys) is dropped as it streams past.
pub struct Selector<F> {
    filter: F,
    armed: Option<String>,
    capture: Option<Capture>,
}

impl<F: Fn(&str, usize) -> bool> Selector<F> {
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            armed: None,
            capture: None,
        }
    }

    /// Whether a selected sub-tree is currently being built.
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    /// Feed one event; returns a sub-tree when one completes.
    pub fn accept(&mut self, event: JsonEvent<'_>, depth: usize) -> Option<Selected> {
        if let Some(capture) = self.capture.as_mut() {
            let value = capture.accept(event)?;
            let key = self.capture.take()?.key;
            return match value {
                Value::Object(value) => Some(Selected::Object { key, value }),
                Value::Array(value) => Some(Selected::Array { key, value }),
                _ => None,
            };
        }

        match event {
            JsonEvent::ObjectKey(key) => {
                self.armed = (self.filter)(&*key, depth).then(|| key.into_owned());
            }
            JsonEvent::StartObject => {
                if let Some(key) = self.armed.take() {
                    self.capture = Some(Capture {
                        key,
                        stack: vec![Partial::object()],
                    });
                }
            }
            JsonEvent::StartArray => {
                if let Some(key) = self.armed.take() {
                    self.capture = Some(Capture {
                        key,
                        stack: vec![Partial::Array(Vec::new())],
                    });
                }
            }
            _ => self.armed = None,
        }
        None
    }
}
