use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! token_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

// Server-issued per-analysis identifier; the only key for derived resources.
token_newtype!(SessionTimestamp);
token_newtype!(SampleFilename);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    High,
    Other(String),
}

impl Severity {
    pub fn is_high(&self) -> bool {
        matches!(self, Severity::High)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::High => "HIGH",
            Severity::Other(label) => label,
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        if value == "HIGH" {
            Severity::High
        } else {
            Severity::Other(value)
        }
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        match value {
            Severity::High => "HIGH".to_string(),
            Severity::Other(label) => label,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_high_only_for_exact_label() {
        assert!(Severity::from("HIGH".to_string()).is_high());
        assert!(!Severity::from("high".to_string()).is_high());
        assert_eq!(
            Severity::from("MEDIUM".to_string()),
            Severity::Other("MEDIUM".to_string())
        );
    }

    #[test]
    fn session_timestamp_serializes_as_plain_string() {
        let ts: SessionTimestamp = serde_json::from_str("\"20240101-0102\"").expect("decode");
        assert_eq!(ts.as_str(), "20240101-0102");
        assert_eq!(serde_json::to_string(&ts).expect("encode"), "\"20240101-0102\"");
    }
}
