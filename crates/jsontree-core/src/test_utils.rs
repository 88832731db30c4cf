//! Test utilities for jsontree-core

use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};
use tempfile::TempDir;

use crate::source::SharedValue;

/// The sample document the viewer opens with.
pub fn sample_user_document() -> Value {
    crate::sample::sample_document()
}

/// A document touching every value type, including empty containers.
pub fn mixed_document() -> Value {
    json!({
        "string": "text",
        "number": 3.5,
        "flag": false,
        "nothing": null,
        "empty_object": {},
        "empty_array": [],
        "matrix": [[1, 2], [3]],
        "a.b": {"c d": "quoted"}
    })
}

/// `{"child": {"parent": <root>}}`
pub fn cyclic_document() -> SharedValue {
    let root = SharedValue::object();
    let child = SharedValue::object();
    child.insert("parent", root.clone());
    root.insert("child", child);
    root
}

/// Array nested `depth` levels deep around a single scalar.
pub fn nested_arrays(depth: usize) -> Value {
    let mut value = json!(0);
    for _ in 0..depth {
        value = Value::Array(vec![value]);
    }
    value
}

/// Write `content` to `name` in a fresh temp dir.
pub fn write_temp_file(name: &str, content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    (dir, path)
}
