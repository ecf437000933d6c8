//! String transforms applied to extracted text before parsing

use serde::{Deserialize, Serialize};

/// A pure string-to-string step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    Trim,
    /// Delete every occurrence of a literal, e.g. a unit suffix.
    Remove(String),
    Replace {
        from: String,
        to: String,
    },
    /// Split on whitespace and keep token `index`. With `count` set, any other
    /// number of tokens yields an empty string.
    Token {
        index: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },
}

impl Transform {
    pub fn remove(literal: &str) -> Self {
        Self::Remove(literal.to_string())
    }

    pub fn replace(from: &str, to: &str) -> Self {
        Self::Replace {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn token(index: usize) -> Self {
        Self::Token { index, count: None }
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Trim => input.trim().to_string(),
            Self::Remove(literal) if literal.is_empty() => input.to_string(),
            Self::Remove(literal) => input.replace(literal.as_str(), ""),
            Self::Replace { from, .. } if from.is_empty() => input.to_string(),
            Self::Replace { from, to } => input.replace(from.as_str(), to),
            Self::Token { index, count } => {
                let tokens: Vec<&str> = input.split_whitespace().collect();
                if count.is_some_and(|n| n != tokens.len()) {
                    return String::new();
                }
                tokens.get(*index).map(|t| t.to_string()).unwrap_or_default()
            }
        }
    }
}

/// Run `steps` in order. `None` once any step leaves nothing but whitespace.
pub fn apply_all(input: &str, steps: &[Transform]) -> Option<String> {
    let mut current = input.trim().to_string();
    if current.is_empty() {
        return None;
    }
    for step in steps {
        current = step.apply(&current);
        if current.trim().is_empty() {
            return None;
        }
    }
    Some(current.trim().to_string())
}
