//! Attribute vocabulary.

use serde_json::Value;

use crate::dom::Element;

/// Attribute-name prefix marking an event handler, e.g. `@click`.
pub const EVENT_SIGIL: char = '@';

/// Attribute-name prefix marking a reactive binding, e.g. `!show`.
pub const BINDING_SIGIL: char = '!';

/// Which element property a binding writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `!innerhtml`: the element's rendered content.
    Content,
    /// `!value`: the element's input value.
    Value,
    /// `!show`: hidden when the result is falsy.
    Visibility,
}

impl BindingKind {
    /// Parse an attribute suffix, ignoring case. Unknown suffixes yield
    /// `None` and are skipped by the compiler.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_lowercase().as_str() {
            "innerhtml" => Some(Self::Content),
            "value" => Some(Self::Value),
            "show" => Some(Self::Visibility),
            _ => None,
        }
    }

    /// Write an expression result into `element`.
    pub fn apply(self, element: &dyn Element, result: &Value) {
        match self {
            Self::Content => element.set_inner_html(&render(result)),
            Self::Value => element.set_value(&render(result)),
            Self::Visibility => element.set_hidden(!is_truthy(result)),
        }
    }
}

/// Text form of a value as written into the DOM.
///
/// Strings are written verbatim and `null` as nothing; anything else as its
/// JSON text.
pub fn render(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Page-script truthiness: `null`, `false`, zero and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn suffixes_are_case_insensitive() {
        assert_eq!(BindingKind::from_suffix("innerHTML"), Some(BindingKind::Content));
        assert_eq!(BindingKind::from_suffix("VALUE"), Some(BindingKind::Value));
        assert_eq!(BindingKind::from_suffix("Show"), Some(BindingKind::Visibility));
        assert_eq!(BindingKind::from_suffix("class"), None);
        assert_eq!(BindingKind::from_suffix(""), None);
    }

    #[test]
    fn truthiness() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            assert!(!is_truthy(&falsy), "{falsy} should be falsy");
        }
        for truthy in [json!(true), json!(-1), json!(0.5), json!("0"), json!([]), json!({})] {
            assert!(is_truthy(&truthy), "{truthy} should be truthy");
        }
    }

    #[test]
    fn rendering() {
        assert_eq!(render(&json!(null)), "");
        assert_eq!(render(&json!("<b>hi</b>")), "<b>hi</b>");
        assert_eq!(render(&json!(42)), "42");
        assert_eq!(render(&json!(true)), "true");
    }
}
