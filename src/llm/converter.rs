//! JSON to ToolArgs conversion for LLM function calls
//!
//! Function-calling providers send arguments as a JSON object. Every member
//! becomes a named argument; tools that also accept positional arguments
//! look names up first.

use crate::ToolArgs;
use anyhow::{bail, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Convert function call JSON arguments to ToolArgs
///
/// Strings are passed through verbatim, `null` members are treated as
/// absent, and every other value is JSON-encoded (`42`, `true`, `[1,2]`).
pub fn json_to_tool_args(tool_name: &str, args: Value) -> Result<ToolArgs> {
    let obj = match args {
        Value::Object(obj) => obj,
        Value::Null => return Ok(ToolArgs::default()),
        other => bail!(
            "Arguments for {} must be a JSON object, got {}",
            tool_name,
            other
        ),
    };

    let mut named_args = HashMap::new();
    for (key, value) in obj {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s,
            other => other.to_string(),
        };
        named_args.insert(key, value);
    }

    debug!(tool = tool_name, args = named_args.len(), "Converted tool call arguments");
    Ok(ToolArgs::with_named_args(Vec::new(), named_args))
}
