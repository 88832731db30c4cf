//! Walkable JSON inputs
//!
//! The walker is generic over [`JsonSource`] so it can traverse both parsed
//! `serde_json::Value` trees and shared in-memory documents built from
//! reference-counted nodes. The latter may contain reference cycles.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

/// The structure of one value, with its children as further sources.
pub enum Shape<S> {
    Scalar,
    Array(Vec<S>),
    Object(Vec<(String, S)>),
}

/// A value the walker can traverse.
pub trait JsonSource: Sized {
    /// Reference identity of a container, used by the cycle guard.
    /// Scalars return `None`.
    fn identity(&self) -> Option<usize>;

    fn shape(&self) -> Shape<Self>;

    /// Materialize this value and its descendants.
    ///
    /// Only call this once the value is known to be acyclic, as the graph
    /// builder does after a successful walk.
    fn to_value(&self) -> Value;
}

impl<'a> JsonSource for &'a Value {
    fn identity(&self) -> Option<usize> {
        let value: &Value = self;
        match value {
            Value::Array(_) | Value::Object(_) => Some(value as *const Value as usize),
            _ => None,
        }
    }

    fn shape(&self) -> Shape<Self> {
        match *self {
            Value::Array(items) => Shape::Array(items.iter().collect()),
            Value::Object(map) => Shape::Object(map.iter().map(|(k, v)| (k.clone(), v)).collect()),
            _ => Shape::Scalar,
        }
    }

    fn to_value(&self) -> Value {
        (*self).clone()
    }
}

/// Contents of a [`SharedValue`].
pub enum SharedNode {
    Scalar(Value),
    Array(Vec<SharedValue>),
    Object(Vec<(String, SharedValue)>),
}

/// A mutable, reference-counted JSON document.
///
/// Children are shared handles, so a container can be inserted beneath
/// itself. Building a graph from such a value fails with
/// [`BuildError::Cyclic`](crate::BuildError::Cyclic).
#[derive(Clone)]
pub struct SharedValue(Rc<RefCell<SharedNode>>);

impl SharedValue {
    fn wrap(node: SharedNode) -> Self {
        SharedValue(Rc::new(RefCell::new(node)))
    }

    pub fn scalar(value: Value) -> Self {
        Self::wrap(SharedNode::Scalar(value))
    }

    pub fn array() -> Self {
        Self::wrap(SharedNode::Array(Vec::new()))
    }

    pub fn object() -> Self {
        Self::wrap(SharedNode::Object(Vec::new()))
    }

    /// Convert a parsed value into a shared document.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Array(items) => {
                Self::wrap(SharedNode::Array(items.iter().map(Self::from_value).collect()))
            }
            Value::Object(map) => Self::wrap(SharedNode::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_value(v)))
                    .collect(),
            )),
            scalar => Self::scalar(scalar.clone()),
        }
    }

    /// Append to an array. Returns `false` if this value is not an array.
    pub fn push(&self, child: SharedValue) -> bool {
        match &mut *self.0.borrow_mut() {
            SharedNode::Array(items) => {
                items.push(child);
                true
            }
            _ => false,
        }
    }

    /// Set an object member, replacing an existing key in place.
    /// Returns `false` if this value is not an object.
    pub fn insert(&self, key: impl Into<String>, child: SharedValue) -> bool {
        let key = key.into();
        match &mut *self.0.borrow_mut() {
            SharedNode::Object(members) => {
                match members.iter_mut().find(|(k, _)| *k == key) {
                    Some((_, slot)) => *slot = child,
                    None => members.push((key, child)),
                }
                true
            }
            _ => false,
        }
    }

    pub fn ptr_eq(&self, other: &SharedValue) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

// Printing children could recurse forever on a cyclic value.
impl fmt::Debug for SharedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0.borrow();
        let (kind, len) = match &*node {
            SharedNode::Scalar(_) => ("scalar", 0),
            SharedNode::Array(items) => ("array", items.len()),
            SharedNode::Object(members) => ("object", members.len()),
        };
        f.debug_struct("SharedValue")
            .field("kind", &kind)
            .field("children", &len)
            .field("ptr", &Rc::as_ptr(&self.0))
            .finish()
    }
}

impl JsonSource for SharedValue {
    fn identity(&self) -> Option<usize> {
        match &*self.0.borrow() {
            SharedNode::Scalar(_) => None,
            _ => Some(Rc::as_ptr(&self.0) as *const () as usize),
        }
    }

    fn shape(&self) -> Shape<Self> {
        match &*self.0.borrow() {
            SharedNode::Scalar(_) => Shape::Scalar,
            SharedNode::Array(items) => Shape::Array(items.clone()),
            SharedNode::Object(members) => Shape::Object(members.clone()),
        }
    }

    fn to_value(&self) -> Value {
        match &*self.0.borrow() {
            SharedNode::Scalar(value) => value.clone(),
            SharedNode::Array(items) => Value::Array(items.iter().map(|c| c.to_value()).collect()),
            SharedNode::Object(members) => {
                let mut map = Map::new();
                for (key, child) in members {
                    map.insert(key.clone(), child.to_value());
                }
                Value::Object(map)
            }
        }
    }
}
