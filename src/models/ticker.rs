use serde::{Deserialize, Serialize};

/// One entry of the ticker universe: exchange code (with market suffix)
/// plus the human-readable company name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Symbol with market suffix, e.g. "7203.T"
    pub code: String,

    /// Company name from the listing CSV
    pub name: String,
}

impl Ticker {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}
