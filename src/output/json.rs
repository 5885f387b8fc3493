// src/output/json.rs

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::result::AggregateResult;

/// `{ name: data }`, pretty-printed with `indent` spaces or compact when `None`.
pub fn render(aggregate: &AggregateResult, indent: Option<usize>) -> Result<String, String> {
    let value = aggregate.to_value();
    let bytes = match indent {
        None => serde_json::to_vec(&value).map_err(|e| e.to_string())?,
        Some(width) => {
            let pad = " ".repeat(width);
            let mut buf = Vec::new();
            let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(pad.as_bytes()));
            value.serialize(&mut ser).map_err(|e| e.to_string())?;
            buf
        }
    };
    String::from_utf8(bytes).map_err(|e| e.to_string())
}
