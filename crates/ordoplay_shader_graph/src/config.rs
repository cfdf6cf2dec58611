// SPDX-License-Identifier: MIT OR Apache-2.0
//! Compiler configuration.
//!
//! Options are plain serde data so tools can keep them next to other
//! project settings in RON.

use serde::{Deserialize, Serialize};

/// Default upper bound for parameter name suffixes
pub const DEFAULT_MAX_NAME_SUFFIX: u32 = 1024;

/// Settings for a [`GraphCompiler`](crate::compiler::GraphCompiler)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Highest numeric suffix tried when disambiguating a parameter name
    pub max_name_suffix: u32,
    /// Names parameters may never take, such as roots of built-in inputs
    pub reserved_names: Vec<String>,
}

impl CompilerOptions {
    /// Parse options from RON text; missing fields keep their defaults
    pub fn from_ron(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    /// Set the suffix bound
    pub fn with_max_name_suffix(mut self, max_name_suffix: u32) -> Self {
        self.max_name_suffix = max_name_suffix;
        self
    }

    /// Reserve an additional name
    pub fn with_reserved_name(mut self, name: impl Into<String>) -> Self {
        self.reserved_names.push(name.into());
        self
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_name_suffix: DEFAULT_MAX_NAME_SUFFIX,
            reserved_names: vec!["in".to_string(), "uniforms".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = CompilerOptions::default();
        assert_eq!(options.max_name_suffix, DEFAULT_MAX_NAME_SUFFIX);
        assert!(options.reserved_names.iter().any(|n| n == "uniforms"));
    }

    #[test]
    fn test_from_ron_partial() {
        let options = CompilerOptions::from_ron("(max_name_suffix: 8)").unwrap();
        assert_eq!(options.max_name_suffix, 8);
        assert_eq!(options.reserved_names, CompilerOptions::default().reserved_names);
    }

    #[test]
    fn test_from_ron_rejects_garbage() {
        assert!(CompilerOptions::from_ron("(max_name_suffix: \"many\")").is_err());
    }

    #[test]
    fn test_serialization() {
        let options = CompilerOptions::default().with_reserved_name("out");
        let ron_str =
            ron::ser::to_string_pretty(&options, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = CompilerOptions::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, options);
    }
}
