//! Compilation options

use serde::{Deserialize, Serialize};

/// What to do when a variable is read before anything was stored into it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UninitPolicy {
    /// Load whatever the fresh stack slot holds
    Preserve,
    /// Store `0.0` into the slot right before the first read
    #[default]
    ZeroInit,
    /// Reject the read with [`crate::EmitError::UninitializedRead`]
    Error,
}

/// Options for one compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompileOptions {
    /// `; ModuleID` and `source_filename` of the emitted module
    pub module_name: String,
    /// Read-before-write handling
    pub uninit_reads: UninitPolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            module_name: "top".to_string(),
            uninit_reads: UninitPolicy::default(),
        }
    }
}

impl CompileOptions {
    /// Override the read-before-write policy
    #[must_use]
    pub fn with_uninit_reads(mut self, policy: UninitPolicy) -> Self {
        self.uninit_reads = policy;
        self
    }

    /// Override the module name
    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }
}
