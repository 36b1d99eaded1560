// Structural response validation.
//
// Block and Transaction values coming back from providers are opaque JSON
// except for the hash hexadecimal contract and conformance to an externally
// supplied schema. A schema is an ordered list of field rules; validation
// surfaces only the first violation, with its dot-separated field path.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Hexadecimal-string contract shared by input checks and schema rules.
pub(crate) fn hex_regex() -> &'static Regex {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| Regex::new("^[A-Fa-f0-9]+$").expect("hex pattern is valid"))
}

/// Checks a caller-supplied field against the hexadecimal contract before
/// any dispatch occurs.
pub(crate) fn ensure_hex(field: &'static str, value: &str) -> Result<(), Error> {
    if hex_regex().is_match(value) {
        Ok(())
    } else {
        Err(Error::invalid_argument(field, "not a hexadecimal string"))
    }
}

/// Expected shape for a single schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// A string matching `^[A-Fa-f0-9]+$`.
    Hex,
    String,
    Number,
    Boolean,
    /// Presence only.
    Any,
}

/// One validation rule: a dot-separated path into the value plus the kind
/// of JSON value expected there.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldRule {
    pub path: String,
    pub kind: FieldKind,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// An externally supplied structural schema definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldRule>,
}

impl Schema {
    /// Baseline block shape: hex hash, numeric height, hex parent hash,
    /// numeric timestamp. Callers integrating a chain with a different
    /// block layout supply their own definition.
    pub fn block_default() -> Self {
        Schema {
            fields: vec![
                FieldRule { path: "hash".into(), kind: FieldKind::Hex, required: true },
                FieldRule { path: "number".into(), kind: FieldKind::Number, required: true },
                FieldRule { path: "parentHash".into(), kind: FieldKind::Hex, required: true },
                FieldRule { path: "timestamp".into(), kind: FieldKind::Number, required: true },
            ],
        }
    }

    /// Baseline transaction shape: hex hash, numeric value, optional hex
    /// block hash (absent while unconfirmed).
    pub fn transaction_default() -> Self {
        Schema {
            fields: vec![
                FieldRule { path: "hash".into(), kind: FieldKind::Hex, required: true },
                FieldRule { path: "value".into(), kind: FieldKind::Number, required: true },
                FieldRule { path: "blockHash".into(), kind: FieldKind::Hex, required: false },
            ],
        }
    }
}

/// The first violated rule's field path and message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl From<Violation> for Error {
    fn from(v: Violation) -> Self {
        Error::InvalidProviderResponse {
            path: v.path,
            message: v.message,
        }
    }
}

/// A schema compiled at client construction time.
#[derive(Clone, Debug)]
pub struct SchemaValidator {
    rules: Vec<FieldRule>,
}

impl SchemaValidator {
    pub fn compile(schema: &Schema) -> Self {
        // Force the shared hex pattern to compile up front rather than on
        // the first validated response.
        let _ = hex_regex();
        SchemaValidator {
            rules: schema.fields.clone(),
        }
    }

    /// Validates `value` rule by rule, returning the first violation.
    pub fn validate(&self, value: &Value) -> Result<(), Violation> {
        if !value.is_object() {
            return Err(Violation {
                path: String::new(),
                message: format!("expected an object, got {}", kind_of(value)),
            });
        }
        for rule in &self.rules {
            match lookup(value, &rule.path) {
                None => {
                    if rule.required {
                        return Err(Violation {
                            path: rule.path.clone(),
                            message: "missing required field".into(),
                        });
                    }
                }
                Some(found) => check_kind(found, rule)?,
            }
        }
        Ok(())
    }
}

fn check_kind(found: &Value, rule: &FieldRule) -> Result<(), Violation> {
    let ok = match rule.kind {
        FieldKind::Hex => match found.as_str() {
            Some(s) => {
                if hex_regex().is_match(s) {
                    true
                } else {
                    return Err(Violation {
                        path: rule.path.clone(),
                        message: "not a hexadecimal string".into(),
                    });
                }
            }
            None => false,
        },
        FieldKind::String => found.is_string(),
        FieldKind::Number => found.is_number(),
        FieldKind::Boolean => found.is_boolean(),
        FieldKind::Any => !found.is_null(),
    };
    if ok {
        Ok(())
    } else {
        Err(Violation {
            path: rule.path.clone(),
            message: format!("expected {}, got {}", kind_name(rule.kind), kind_of(found)),
        })
    }
}

// Walk a dot-separated path through nested objects. `null` counts as absent
// so optional fields may be returned either way.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Hex => "a hexadecimal string",
        FieldKind::String => "a string",
        FieldKind::Number => "a number",
        FieldKind::Boolean => "a boolean",
        FieldKind::Any => "a value",
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
