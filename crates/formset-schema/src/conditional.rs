//! Conditional visibility definitions
//!
//! A simple conditional reads as "show (or hide) this component when the
//! value at `when` equals `eq`". Without `when` the `show` flag applies
//! unconditionally.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    /// `true`, `false`, `"true"` or `"false"`; anything else means unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<Value>,
    /// Data key the condition watches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
    /// Value the watched key is compared against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eq: Option<Value>,
    /// JSON-logic payload, evaluated by an external evaluator if one is plugged in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<Value>,
}

impl Conditional {
    pub fn show(show: bool) -> Self {
        Self {
            show: Some(Value::Bool(show)),
            ..Self::default()
        }
    }

    pub fn show_when(show: bool, when: impl Into<String>, eq: impl Into<Value>) -> Self {
        Self {
            show: Some(Value::Bool(show)),
            when: Some(when.into()),
            eq: Some(eq.into()),
            json: None,
        }
    }

    /// The `show` flag, if it is a usable boolean
    pub fn show_flag(&self) -> Option<bool> {
        match &self.show {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) if s == "true" => Some(true),
            Some(Value::String(s)) if s == "false" => Some(false),
            _ => None,
        }
    }

    /// Whether this conditional carries anything to evaluate
    pub fn is_set(&self) -> bool {
        self.when.as_deref().is_some_and(|w| !w.is_empty())
            || self.json.as_ref().is_some_and(|j| !j.is_null())
            || self.show_flag().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_flag_parsing() {
        assert_eq!(Conditional::show(false).show_flag(), Some(false));

        let cond: Conditional = serde_json::from_str(r#"{"show":"true"}"#).unwrap();
        assert_eq!(cond.show_flag(), Some(true));

        let cond: Conditional = serde_json::from_str(r#"{"show":""}"#).unwrap();
        assert_eq!(cond.show_flag(), None);
    }

    #[test]
    fn test_is_set() {
        assert!(!Conditional::default().is_set());
        assert!(Conditional::show(true).is_set());

        let cond: Conditional = serde_json::from_str(r#"{"show":null,"when":"","eq":""}"#).unwrap();
        assert!(!cond.is_set());

        assert!(Conditional::show_when(true, "kind", "a").is_set());
    }
}
