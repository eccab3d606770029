//! Persisted UI preferences

use serde::{Deserialize, Serialize};

/// The single locally persisted preference set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Dark theme enabled
    #[serde(default)]
    pub dark_mode: bool,
}
