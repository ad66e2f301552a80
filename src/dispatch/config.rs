//! Resolver configuration

use serde::{Deserialize, Serialize};

/// Knobs for a [`Resolver`](super::Resolver), fixed when an environment is
/// sealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// How many requirements may be nested inside one another before
    /// resolution is declared divergent.
    pub max_depth: usize,
    /// Cache witnesses for ground requirements resolved without any
    /// received witnesses in scope.
    pub memoize: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            max_depth: 64,
            memoize: true,
        }
    }
}

impl ResolverConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn without_memoization(mut self) -> Self {
        self.memoize = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ResolverConfig = serde_json::from_str(r#"{ "max_depth": 8 }"#).unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(config.memoize);

        let config: ResolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn builders() {
        let config = ResolverConfig::default()
            .with_max_depth(3)
            .without_memoization();
        assert_eq!(config.max_depth, 3);
        assert!(!config.memoize);
    }
}
