use serde::{Deserialize, Serialize};

/// Verdict on one team for one race.
///
/// `errors` block registration, `warnings` are informational. Both are shown
/// to users verbatim. A result is derived from its inputs and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ValidationResult {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Resolved age category name (competitive races only)
    pub category: Option<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            category: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.add_error(message);
        result
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.is_valid = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Append another result's errors and warnings. The category is not copied.
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.errors.is_empty() {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_valid() {
        let result = ValidationResult::new();
        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result.category.is_none());
    }

    #[test]
    fn test_warning_does_not_invalidate() {
        let mut result = ValidationResult::new();
        result.add_warning("heads up");
        assert!(result.is_valid);
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut result = ValidationResult::invalid("first");
        let mut other = ValidationResult::invalid("second");
        other.add_warning("note");
        other.category = Some("Senior".to_string());

        result.merge(other);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["first", "second"]);
        assert_eq!(result.warnings, vec!["note"]);
        assert!(result.category.is_none());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(ValidationResult::invalid("x")).unwrap();
        assert_eq!(json["isValid"], false);
        assert_eq!(json["errors"][0], "x");
        assert!(json["category"].is_null());
    }
}
