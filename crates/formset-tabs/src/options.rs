//! Render options for a tabs container

use serde::{Deserialize, Serialize};

/// How reconciliation decides that a tab slot can keep its children
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReusePolicy {
    /// Reuse only when the slot holds the very same tab definition (`Arc::ptr_eq`)
    #[default]
    Identity,
    /// Also reuse when key and content are equal, so cloned definitions
    /// (e.g. after a logic pass) do not rebuild every tab
    KeyAndContent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabsOptions {
    /// Form builder is editing this form: show every tab, run no logic
    pub builder_mode: bool,
    /// Builder preview: show every tab, run no event logic
    pub preview_mode: bool,
    pub read_only: bool,
    /// Render all tabs at once with the flat template
    pub flatten: bool,
    pub pdf: bool,
    /// Mark erroring tab links with `tab-error` instead of `has-error`
    pub highlight_errors: bool,
    pub reuse_policy: ReusePolicy,
}

impl TabsOptions {
    /// Every declared tab is shown regardless of conditionals
    pub fn shows_all_tabs(&self) -> bool {
        self.builder_mode || self.preview_mode
    }

    pub fn is_flat(&self) -> bool {
        self.flatten || self.pdf
    }
}
