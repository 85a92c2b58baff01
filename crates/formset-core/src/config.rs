//! Form configuration

use serde::{Deserialize, Serialize};

use formset_tabs::{ReusePolicy, TabsOptions};

use crate::error::CoreError;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Form builder: all tabs shown, no logic
    pub builder_mode: bool,
    /// Builder preview: all tabs shown, no event logic
    pub preview_mode: bool,
    pub read_only: bool,
    /// Render every tab at once
    pub flatten: bool,
    /// PDF output, rendered like `flatten`
    pub pdf: bool,
    /// Use the stronger tab error marker
    pub highlight_errors: bool,
    pub reuse_policy: ReusePolicy,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.builder_mode && self.preview_mode {
            return Err(CoreError::Config(
                "builderMode and previewMode are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    /// Options handed to each tabs container
    pub fn tabs_options(&self) -> TabsOptions {
        TabsOptions {
            builder_mode: self.builder_mode,
            preview_mode: self.preview_mode,
            read_only: self.read_only,
            flatten: self.flatten,
            pdf: self.pdf,
            highlight_errors: self.highlight_errors,
            reuse_policy: self.reuse_policy,
        }
    }
}
