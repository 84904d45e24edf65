//! Sensitive data marker
//!
//! Client payment information travels through the engine and is echoed back
//! to API callers, but it must never reach a log line. `Sensitive<T>`
//! serializes its value unchanged while redacting it from `Debug` and
//! `Display`, so a `tracing` field or a `{:?}` of a whole `Client` stays
//! clean.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const REDACTED: &str = "***REDACTED***";

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use prospectflow_core_types::Sensitive;
///
/// let iban = Sensitive::new("FR76 3000 6000 0112 3456 7890 189");
/// assert_eq!(format!("{:?}", iban), "***REDACTED***");
/// assert_eq!(iban.expose(), &"FR76 3000 6000 0112 3456 7890 189");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T: Serialize> Serialize for Sensitive<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sensitive<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        T::deserialize(deserializer).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_redact() {
        let secret = Sensitive::new("IBAN1".to_string());
        assert_eq!(format!("{:?}", secret), REDACTED);
        assert_eq!(format!("{}", secret), REDACTED);
    }

    #[test]
    fn test_serialization_exposes_value() {
        let secret = Sensitive::new("IBAN1".to_string());
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"IBAN1\"");

        let back: Sensitive<String> = serde_json::from_str("\"IBAN2\"").unwrap();
        assert_eq!(back.expose(), "IBAN2");
    }

    #[test]
    fn test_redaction_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Billing {
            holder: String,
            payment: Option<Sensitive<String>>,
        }

        let billing = Billing {
            holder: "alice".to_string(),
            payment: Some(Sensitive::new("IBAN-SECRET".to_string())),
        };

        let debug_str = format!("{:?}", billing);
        assert!(debug_str.contains("alice"));
        assert!(!debug_str.contains("IBAN-SECRET"));
    }
}
