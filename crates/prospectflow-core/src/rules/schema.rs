use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::errors::{PipelineError, Result};
use crate::model::{InteractionType, ProspectStatus};

/// Value kind a field must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string
    String,
    /// Array of non-empty strings
    StringArray,
    /// One of a fixed set of strings, matched exactly
    Enum(&'static [&'static str]),
    /// RFC 3339 timestamp, `YYYY-MM-DD`, or epoch milliseconds
    Date,
    /// String in email format
    Email,
}

/// Whether a field must be present and whether it may be null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    /// Optional; `null` and `""` are accepted and mean "no value"
    Nullable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
        }
    }

    pub const fn nullable(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            presence: Presence::Nullable,
        }
    }
}

/// Declarative payload schema for one entity operation
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
}

const PROSPECT_CREATE_STATUS: &[&str] = &["Prospect"];

pub const PROSPECT_CREATE: Schema = Schema {
    entity: "prospect",
    fields: &[
        FieldSpec::required("nom", FieldKind::String),
        FieldSpec::required("email", FieldKind::Email),
        FieldSpec::optional("interets", FieldKind::StringArray),
        FieldSpec::required("statut", FieldKind::Enum(PROSPECT_CREATE_STATUS)),
    ],
};

pub const PROSPECT_UPDATE: Schema = Schema {
    entity: "prospect",
    fields: &[
        FieldSpec::required("nom", FieldKind::String),
        FieldSpec::required("email", FieldKind::Email),
        FieldSpec::optional("interets", FieldKind::StringArray),
        FieldSpec::optional("statut", FieldKind::Enum(ProspectStatus::VALUES)),
    ],
};

pub const CLIENT_CREATE: Schema = Schema {
    entity: "client",
    fields: &[
        FieldSpec::required("prospectId", FieldKind::String),
        FieldSpec::nullable("adresse"),
        FieldSpec::nullable("numeroTelephone"),
        FieldSpec::nullable("informationsPaiement"),
    ],
};

pub const CLIENT_UPDATE: Schema = Schema {
    entity: "client",
    fields: &[
        FieldSpec::optional("nom", FieldKind::String),
        FieldSpec::optional("email", FieldKind::Email),
        FieldSpec::optional("interets", FieldKind::StringArray),
        FieldSpec::nullable("adresse"),
        FieldSpec::nullable("numeroTelephone"),
        FieldSpec::nullable("informationsPaiement"),
    ],
};

pub const INTERACTION: Schema = Schema {
    entity: "interaction",
    fields: &[
        FieldSpec::required("type", FieldKind::Enum(InteractionType::VALUES)),
        FieldSpec::required("date", FieldKind::Date),
        FieldSpec::required("notes", FieldKind::String),
        FieldSpec::required("prospectId", FieldKind::String),
    ],
};

impl Schema {
    /// Validate a payload, returning the first violation found
    ///
    /// Unknown keys are checked before declared fields, and declared fields
    /// in declaration order, so the reported field is deterministic.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` naming the offending field.
    pub fn validate(&self, payload: &Value) -> Result<()> {
        let object = payload
            .as_object()
            .ok_or_else(|| PipelineError::validation(self.entity, "must be an object"))?;

        if let Some(unknown) = object
            .keys()
            .find(|key| !self.fields.iter().any(|f| f.name == key.as_str()))
        {
            return Err(PipelineError::validation(unknown.as_str(), "is not allowed"));
        }

        for spec in self.fields {
            check_field(spec, object)?;
        }

        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn check_field(spec: &FieldSpec, object: &Map<String, Value>) -> Result<()> {
    let value = match object.get(spec.name) {
        None => {
            return match spec.presence {
                Presence::Required => Err(PipelineError::validation(spec.name, "is required")),
                Presence::Optional | Presence::Nullable => Ok(()),
            };
        }
        Some(value) => value,
    };

    if spec.presence == Presence::Nullable {
        return match value {
            Value::Null | Value::String(_) => Ok(()),
            _ => Err(PipelineError::validation(spec.name, "must be a string")),
        };
    }

    check_kind(spec.name, spec.kind, value)
}

fn check_kind(name: &str, kind: FieldKind, value: &Value) -> Result<()> {
    match kind {
        FieldKind::String => non_empty_string(name, value).map(|_| ()),
        FieldKind::Email => {
            let email = non_empty_string(name, value)?;
            if email_regex().is_some_and(|re| re.is_match(email.trim())) {
                Ok(())
            } else {
                Err(PipelineError::validation(name, "must be a valid email"))
            }
        }
        FieldKind::StringArray => {
            let items = value
                .as_array()
                .ok_or_else(|| PipelineError::validation(name, "must be an array"))?;
            for (index, item) in items.iter().enumerate() {
                non_empty_string(&format!("{}[{}]", name, index), item)?;
            }
            Ok(())
        }
        FieldKind::Enum(allowed) => {
            let raw = value
                .as_str()
                .ok_or_else(|| PipelineError::validation(name, "must be a string"))?;
            if allowed.contains(&raw) {
                Ok(())
            } else {
                Err(PipelineError::validation(
                    name,
                    format!("must be one of [{}]", allowed.join(", ")),
                ))
            }
        }
        FieldKind::Date => parse_date(value)
            .map(|_| ())
            .ok_or_else(|| PipelineError::validation(name, "must be a valid date")),
    }
}

fn non_empty_string<'a>(name: &str, value: &'a Value) -> Result<&'a str> {
    let raw = value
        .as_str()
        .ok_or_else(|| PipelineError::validation(name, "must be a string"))?;
    if raw.trim().is_empty() {
        return Err(PipelineError::validation(name, "is not allowed to be empty"));
    }
    Ok(raw)
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Years a stored date may fall in; outside this range RFC 3339 text is no
/// longer four-digit and stops sorting or parsing back
const DATE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Parse a date value in any accepted form
///
/// Strings may be RFC 3339, a bare `YYYY-MM-DD` (midnight UTC), or a local
/// `YYYY-MM-DDTHH:MM[:SS]` read as UTC. Integers are epoch milliseconds.
/// Dates outside years 0000 to 9999 are rejected.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    parse_any_date(value).filter(|at| DATE_YEARS.contains(&at.year()))
}

fn parse_any_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => {
            let raw = raw.trim();
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Some(parsed.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                    return Some(naive.and_utc());
                }
            }
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(number) => number
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}
