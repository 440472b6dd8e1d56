use serde::{Deserialize, Serialize};

/// What the locator does when no node matches an element's fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Take the first unprocessed node of the expected kind in scope.
    #[default]
    Positional,
    /// Report a lookup failure.
    Strict,
}

/// Settings for one injection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionSettings {
    pub fallback: FallbackPolicy,

    /// Apply Unicode NFC before comparing visible text.
    pub normalize_unicode: bool,
}

impl Default for InjectionSettings {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::Positional,
            normalize_unicode: true,
        }
    }
}

impl InjectionSettings {
    pub fn strict() -> Self {
        Self {
            fallback: FallbackPolicy::Strict,
            ..Self::default()
        }
    }
}
