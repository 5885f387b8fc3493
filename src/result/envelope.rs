// src/result/envelope.rs

//! Plugin output envelope and its validation.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::exec::{ExecutionOutcome, OutcomeStatus};

/// Longest stdout excerpt included in a parse rejection.
pub const PREVIEW_LIMIT: usize = 200;

/// Wire shape of a plugin's stdout. Everything is optional here so that
/// missing fields can be reported by name instead of as a parse error.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    metrics: Option<Value>,
    #[serde(default)]
    data_schema: Option<Value>,
    #[serde(default)]
    data_schema_url: Option<String>,
}

/// Where a plugin says its `data` is described.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSchema {
    Inline(Value),
    Url(String),
}

/// A fully validated plugin result.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub name: String,
    pub version: String,
    pub data: Value,
    pub metrics: Option<Value>,
    pub schema: Option<DataSchema>,
}

/// Why an outcome did not make it into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("plugin exited with {}; stderr: {stderr}", describe_exit(.exit_code))]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to execute plugin: {0}")]
    SpawnError(String),

    #[error("plugin was cancelled before it finished")]
    Cancelled,

    #[error("failed parsing JSON output: {error}. Output (truncated): {preview}")]
    Unparsable { error: String, preview: String },

    #[error("plugin output missing required field '{0}'")]
    MissingField(&'static str),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {c}"),
        None => "a signal".to_string(),
    }
}

/// Check one execution outcome and extract its envelope.
pub fn validate(outcome: &ExecutionOutcome) -> Result<Envelope, Rejection> {
    match &outcome.status {
        OutcomeStatus::Success { stdout } => parse_envelope(stdout),
        OutcomeStatus::Failed { exit_code, stderr } => Err(Rejection::Failed {
            exit_code: *exit_code,
            stderr: stderr.trim_end().to_string(),
        }),
        OutcomeStatus::SpawnError(msg) => Err(Rejection::SpawnError(msg.clone())),
        OutcomeStatus::Cancelled => Err(Rejection::Cancelled),
    }
}

/// Parse and check raw stdout bytes.
pub fn parse_envelope(stdout: &[u8]) -> Result<Envelope, Rejection> {
    let raw: RawEnvelope = serde_json::from_slice(stdout).map_err(|e| Rejection::Unparsable {
        error: e.to_string(),
        preview: preview(stdout),
    })?;

    let name = non_empty(raw.name).ok_or(Rejection::MissingField("name"))?;
    let version = non_empty(raw.version).ok_or(Rejection::MissingField("version"))?;
    let data = raw.data.ok_or(Rejection::MissingField("data"))?;

    if let Some(metrics) = &raw.metrics {
        if !metrics.is_object() {
            warn!(plugin = %name, "'metrics' is not an object; keeping it as reported");
        }
    }

    let schema = match (raw.data_schema, raw.data_schema_url) {
        (Some(inline), Some(_)) => {
            warn!(plugin = %name, "both 'data_schema' and 'data_schema_url' set; using 'data_schema'");
            Some(DataSchema::Inline(inline))
        }
        (Some(inline), None) => Some(DataSchema::Inline(inline)),
        (None, Some(url)) => Some(DataSchema::Url(url)),
        (None, None) => None,
    };

    Ok(Envelope {
        name,
        version,
        data,
        metrics: raw.metrics,
        schema,
    })
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// Lossy UTF-8 excerpt of at most [`PREVIEW_LIMIT`] bytes, marked with `...`
/// when cut.
pub fn preview(bytes: &[u8]) -> String {
    if bytes.len() <= PREVIEW_LIMIT {
        return String::from_utf8_lossy(bytes).into_owned();
    }
    let mut out = String::from_utf8_lossy(&bytes[..PREVIEW_LIMIT]).into_owned();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::discover::Candidate;

    fn outcome(status: OutcomeStatus) -> ExecutionOutcome {
        ExecutionOutcome {
            candidate: Candidate {
                path: "/bin/ctx-a".into(),
                name: "ctx-a".into(),
                executable: true,
            },
            index: 0,
            status,
            duration: Duration::from_millis(1),
        }
    }

    #[test]
    fn accepts_minimal_envelope() {
        let env = parse_envelope(br#"{"name":"alpha","version":"1.0","data":{"x":1}}"#).unwrap();
        assert_eq!(env.name, "alpha");
        assert_eq!(env.version, "1.0");
        assert_eq!(env.data, json!({"x": 1}));
        assert_eq!(env.schema, None);
    }

    #[test]
    fn accepts_empty_data_object_and_trailing_newline() {
        let env = parse_envelope(b"{\"name\":\"a\",\"version\":\"0\",\"data\":{}}\n").unwrap();
        assert_eq!(env.data, json!({}));
    }

    #[test]
    fn missing_fields_are_named() {
        let cases: &[(&[u8], &str)] = &[
            (br#"{"version":"1","data":{}}"#, "name"),
            (br#"{"name":"","version":"1","data":{}}"#, "name"),
            (br#"{"name":"a","data":{}}"#, "version"),
            (br#"{"name":"a","version":"1"}"#, "data"),
            (br#"{"name":"a","version":"1","data":null}"#, "data"),
        ];
        for (input, field) in cases {
            assert_eq!(parse_envelope(input), Err(Rejection::MissingField(*field)));
        }
    }

    #[test]
    fn garbage_is_unparsable_with_preview() {
        let noise = vec![b'x'; 500];
        match parse_envelope(&noise) {
            Err(Rejection::Unparsable { preview, .. }) => {
                assert_eq!(preview.len(), PREVIEW_LIMIT + 3);
                assert!(preview.ends_with("..."));
            }
            other => panic!("expected Unparsable, got {other:?}"),
        }
    }

    #[test]
    fn two_objects_on_stdout_is_a_violation() {
        let out = br#"{"name":"a","version":"1","data":{}}{"name":"b","version":"1","data":{}}"#;
        assert!(matches!(parse_envelope(out), Err(Rejection::Unparsable { .. })));
    }

    #[test]
    fn schema_forms() {
        let env = parse_envelope(
            br#"{"name":"a","version":"1","data":{},"data_schema_url":"https://x/s.json","metrics":{"ms":3}}"#,
        )
        .unwrap();
        assert_eq!(env.schema, Some(DataSchema::Url("https://x/s.json".into())));
        assert_eq!(env.metrics, Some(json!({"ms": 3})));

        let env = parse_envelope(
            br#"{"name":"a","version":"1","data":{},"data_schema":{"type":"object"},"data_schema_url":"u"}"#,
        )
        .unwrap();
        assert_eq!(env.schema, Some(DataSchema::Inline(json!({"type": "object"}))));
    }

    #[test]
    fn failed_outcomes_are_rejected_with_reason() {
        let r = validate(&outcome(OutcomeStatus::Failed { exit_code: Some(1), stderr: "bad\n".into() }));
        let err = r.unwrap_err();
        assert_eq!(err.to_string(), "plugin exited with status 1; stderr: bad");

        let r = validate(&outcome(OutcomeStatus::Failed { exit_code: None, stderr: String::new() }));
        assert!(r.unwrap_err().to_string().contains("a signal"));

        assert_eq!(validate(&outcome(OutcomeStatus::Cancelled)), Err(Rejection::Cancelled));
        assert!(matches!(
            validate(&outcome(OutcomeStatus::SpawnError("nope".into()))),
            Err(Rejection::SpawnError(_))
        ));
    }

    #[test]
    fn successful_outcome_is_parsed() {
        let stdout = br#"{"name":"beta","version":"2","data":{"y":[1,2]}}"#.to_vec();
        let env = validate(&outcome(OutcomeStatus::Success { stdout })).unwrap();
        assert_eq!(env.data, json!({"y": [1, 2]}));
    }
}
