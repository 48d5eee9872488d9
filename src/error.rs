//! Error types for model construction, completion and generation

use thiserror::Error;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Model errors
///
/// Everything except the I/O and parse variants is a configuration error:
/// raised synchronously while the model is built or completed, and fatal to
/// the run.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{property} on {element} is invalid as {reason}")]
    TypeMismatch {
        element: String,
        property: &'static str,
        reason: String,
    },

    #[error("Attempting to redefine {kind} '{name}' on {scope}")]
    Duplicate {
        kind: &'static str,
        name: String,
        scope: String,
    },

    #[error("{kind} {name} attempting to extend final {kind} {parent}")]
    ExtendFinal {
        kind: &'static str,
        name: String,
        parent: String,
    },

    #[error("Unable to find {kind} named {name} on {scope}. Available {kind} set = {available}{hint}")]
    NotFound {
        kind: &'static str,
        name: String,
        scope: String,
        available: String,
        hint: String,
    },

    #[error("Invalid configuration on {element}: {message}")]
    Invalid { element: String, message: String },

    #[error("Facet '{facet}' is not enabled on {element}")]
    FacetNotEnabled { facet: String, element: String },

    #[error("Facet '{facet}' does not enhance {kind} elements such as {element}")]
    FacetNotApplicable {
        facet: String,
        kind: String,
        element: String,
    },

    #[error("Facet '{facet}' view on {element} is not a {expected}")]
    FacetViewType {
        facet: String,
        element: String,
        expected: &'static str,
    },

    #[error("Repository {0} has already been completed")]
    AlreadyCompleted(String),

    #[error("Repository {0} must be completed before generation")]
    NotCompleted(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl ModelError {
    /// Build a lookup failure that lists the valid alternatives and, when one
    /// is close enough, suggests it.
    pub fn not_found<S: AsRef<str>>(
        kind: &'static str,
        name: &str,
        scope: &str,
        available: &[S],
    ) -> Self {
        let hint = crate::naming::closest_match(name, available)
            .map(|candidate| format!(". Did you mean '{}'?", candidate))
            .unwrap_or_default();
        let available = available
            .iter()
            .map(|s| s.as_ref())
            .collect::<Vec<_>>()
            .join(", ");
        ModelError::NotFound {
            kind,
            name: name.to_string(),
            scope: scope.to_string(),
            available,
            hint,
        }
    }

    pub fn invalid(element: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Invalid {
            element: element.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_alternatives() {
        let err = ModelError::not_found("attribute", "nam", "Acme.Person", &["id", "name"]);
        let message = err.to_string();
        assert!(message.contains("Available attribute set = id, name"));
        assert!(message.contains("Did you mean 'name'?"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = ModelError::TypeMismatch {
            element: "Acme.Person.age".to_string(),
            property: "length",
            reason: "attribute is not a string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "length on Acme.Person.age is invalid as attribute is not a string"
        );
    }
}
