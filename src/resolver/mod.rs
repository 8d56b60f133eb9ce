//! Variable validation and substitution.
//!
//! Pure functions shared by the send pipeline: checking that a caller
//! supplied every variable a mail type declares, and replacing variable
//! tokens in template strings. Substitution is a literal substring replace,
//! applied once per variable in map insertion order; replacement values are
//! never re-scanned for tokens of variables that came earlier in the map.

use indexmap::IndexMap;
use thiserror::Error;

use crate::template::MailTemplate;

/// Ordered variable map: variable name as key, replacement (or human label,
/// on the declaring side) as value. Insertion order drives both validation
/// and substitution order.
pub type VariableMap = IndexMap<String, String>;

/// How a variable key appears inside a template string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionMode {
    /// The key is wrapped in delimiters: `[[key]]`. Used for subject, body,
    /// sender fields and cc/bcc values, so ordinary text is never replaced
    /// by accident.
    Token,
    /// The bare key text is the placeholder. Used for the recipients list,
    /// which holds raw recipient keys instead of delimited tokens.
    Bare,
}

/// A declared variable that was not supplied by the caller.
///
/// Mapped at the call site to the content or recipient error kind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("variable {0} is missing")]
pub struct MissingVariable(pub String);

/// Replace every occurrence of each variable in `text`.
///
/// Unmatched tokens are left verbatim; a text without any matching token is
/// returned unchanged.
pub fn substitute(variables: &VariableMap, text: &str, mode: SubstitutionMode) -> String {
    let mut result = text.to_string();

    for (name, value) in variables {
        match mode {
            SubstitutionMode::Token => {
                let token = format!(
                    "{}{}{}",
                    MailTemplate::VARIABLE_OPEN,
                    name,
                    MailTemplate::VARIABLE_CLOSE
                );
                result = result.replace(&token, value);
            }
            SubstitutionMode::Bare => {
                result = result.replace(name.as_str(), value);
            }
        }
    }

    result
}

/// Apply [`substitute`] element-wise. An absent list is an empty result, not
/// an error.
pub fn substitute_all(
    variables: &VariableMap,
    items: Option<&[String]>,
    mode: SubstitutionMode,
) -> Vec<String> {
    match items {
        Some(items) => items
            .iter()
            .map(|item| substitute(variables, item, mode))
            .collect(),
        None => Vec::new(),
    }
}

/// Check that every declared key exists in the provided map.
///
/// Fails fast on the first missing key, in declaration order. Extra provided
/// keys are legal and ignored.
pub fn validate_required(
    declared: &VariableMap,
    provided: &VariableMap,
) -> Result<(), MissingVariable> {
    for name in declared.keys() {
        if !provided.contains_key(name) {
            return Err(MissingVariable(name.clone()));
        }
    }

    Ok(())
}
