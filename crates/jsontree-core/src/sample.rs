//! Document shown when the viewer starts without a file

use serde_json::{Value, json};

pub fn sample_document() -> Value {
    json!({
        "user": {
            "id": 1,
            "name": "John Doe",
            "address": {
                "city": "New York",
                "country": "USA"
            },
            "items": [
                {"name": "item1"},
                {"name": "item2"}
            ]
        }
    })
}
