//! Tab switching
//!
//! ```text
//! [no tabs]        (zero active tabs, every switch is rejected)
//! Tab(i) --set_tab(j)--> Tab(j)   when instance j, panel j exist and tab j is enabled
//! Tab(i) --set_tab(j)--> Tab(i)   otherwise (silently ignored)
//! ```

use serde::{Deserialize, Serialize};

pub(crate) const PANEL_ACTIVE: &str = "formio-tab-panel-active";
pub(crate) const LINK_ACTIVE: &str = "formio-tab-link-active";
pub(crate) const LINK_CONTAINER_ACTIVE: &str = "formio-tab-link-container-active";

pub(crate) const INVALID: &str = "is-invalid";
pub(crate) const TAB_ERROR: &str = "tab-error";
pub(crate) const HAS_ERROR: &str = "has-error";

/// Why a switch was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwitchRejection {
    /// No active tab instance at the target index
    NoInstance,
    /// The target tab has not been rendered and attached
    NoPanel,
    /// The target tab item is disabled
    Disabled,
}

impl SwitchRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchRejection::NoInstance => "no instance",
            SwitchRejection::NoPanel => "no panel",
            SwitchRejection::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for SwitchRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TabSwitch {
    Switched { from: usize, to: usize },
    Rejected(SwitchRejection),
}

impl TabSwitch {
    pub fn is_switched(&self) -> bool {
        matches!(self, TabSwitch::Switched { .. })
    }
}
