//! # Hookpoint names

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in the host's pipeline where the temporal layer must be called
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hookpoint {
    /// Before a document is written
    OnBeforeWrite,
    /// After the host finished a write it was allowed to perform
    OnAfterWrite,
    /// Before a document is deleted
    OnBeforeDelete,
    /// After the host's delete machinery ran
    OnAfterDelete,
    /// When a document is read
    OnAfterRead,
    /// For every document a query returns
    OnQueryResult,
    /// When the host starts the store
    OnStartup,
    /// When the host shuts the store down
    OnShutdown,
}

impl Hookpoint {
    /// Every hookpoint, in pipeline order
    pub const ALL: [Hookpoint; 8] = [
        Hookpoint::OnBeforeWrite,
        Hookpoint::OnAfterWrite,
        Hookpoint::OnBeforeDelete,
        Hookpoint::OnAfterDelete,
        Hookpoint::OnAfterRead,
        Hookpoint::OnQueryResult,
        Hookpoint::OnStartup,
        Hookpoint::OnShutdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Hookpoint::OnBeforeWrite => "on_before_write",
            Hookpoint::OnAfterWrite => "on_after_write",
            Hookpoint::OnBeforeDelete => "on_before_delete",
            Hookpoint::OnAfterDelete => "on_after_delete",
            Hookpoint::OnAfterRead => "on_after_read",
            Hookpoint::OnQueryResult => "on_query_result",
            Hookpoint::OnStartup => "on_startup",
            Hookpoint::OnShutdown => "on_shutdown",
        }
    }
}

impl fmt::Display for Hookpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_serde() {
        for hook in Hookpoint::ALL {
            let json = serde_json::to_value(hook).unwrap();
            assert_eq!(json, hook.as_str());
        }
    }
}
