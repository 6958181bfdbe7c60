// SPDX-License-Identifier: Apache-2.0

use rolemesh_conditions::{FactValue, Facts};
use rolemesh_core::canonical;
use serde_json::Value;
use std::path::Path;

use crate::{CliError, OutputMode};

pub(crate) fn emit_ok(output_mode: OutputMode, payload: &Value) -> Result<(), CliError> {
    if output_mode.json {
        let bytes = canonical::stable_json_bytes(payload)
            .map_err(|e| CliError::internal(e.to_string()))?;
        let text = String::from_utf8(bytes).map_err(|e| CliError::internal(e.to_string()))?;
        println!("{text}");
    } else {
        let text = canonical::stable_json_pretty(payload)
            .map_err(|e| CliError::internal(e.to_string()))?;
        println!("{text}");
    }
    Ok(())
}

/// Reads a YAML document; JSON files parse the same way.
pub(crate) fn read_document(path: &Path) -> Result<Value, CliError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("failed to read {}: {e}", path.display())))?;
    serde_yaml::from_str::<Value>(&raw).map_err(|e| {
        CliError::invalid_document(format!("{} is not a valid document: {e}", path.display()))
    })
}

/// `true`/`false` become booleans, integers become integers, anything else
/// stays a string. Quote a value to force a string.
pub(crate) fn parse_fact(raw: &str) -> Result<(String, FactValue), CliError> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| CliError::usage(format!("fact '{raw}' must be name=value")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::usage(format!("fact '{raw}' has an empty name")));
    }
    let value = value.trim();
    let parsed = if let Some(quoted) = strip_quotes(value) {
        FactValue::from(quoted)
    } else if value == "true" || value == "false" {
        FactValue::from(value == "true")
    } else if let Ok(n) = value.parse::<i64>() {
        FactValue::from(n)
    } else {
        FactValue::from(value)
    };
    Ok((name.to_string(), parsed))
}

fn strip_quotes(value: &str) -> Option<&str> {
    ['\'', '"'].into_iter().find_map(|q| {
        value
            .strip_prefix(q)
            .and_then(|rest| rest.strip_suffix(q))
    })
}

pub(crate) fn collect_facts(file: Option<&Path>, pairs: &[String]) -> Result<Facts, CliError> {
    let mut facts = match file {
        Some(path) => Facts::from_json(&read_document(path)?),
        None => Facts::new(),
    };
    for raw in pairs {
        let (name, value) = parse_fact(raw)?;
        facts.insert(&name, value);
    }
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fact_values_are_typed() {
        assert_eq!(
            parse_fact("cluster:mode=multinode").expect("fact"),
            ("cluster:mode".to_string(), FactValue::from("multinode"))
        );
        assert_eq!(
            parse_fact("settings:count = 3").expect("fact"),
            ("settings:count".to_string(), FactValue::from(3_i64))
        );
        assert_eq!(
            parse_fact("settings:enabled=true").expect("fact"),
            ("settings:enabled".to_string(), FactValue::from(true))
        );
        assert_eq!(
            parse_fact("settings:label='3'").expect("fact"),
            ("settings:label".to_string(), FactValue::from("3"))
        );
    }

    #[test]
    fn malformed_facts_are_usage_errors() {
        assert!(parse_fact("no-equals").is_err());
        assert!(parse_fact("=value").is_err());
    }
}
