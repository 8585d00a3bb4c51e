//! Adjustment settings

use serde::Deserialize;

use crate::types::AdjustmentResult;

/// Settings that shape how adjustment entries are computed
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdjustmentSettings {
    /// Decimal places for currency amounts
    #[serde(default = "default_currency_precision")]
    pub currency_precision: u32,
    /// Restrict outstanding vouchers to the document's cost center
    #[serde(default)]
    pub allow_cost_center_in_entry_of_bs_account: bool,
}

fn default_currency_precision() -> u32 {
    2
}

impl Default for AdjustmentSettings {
    fn default() -> Self {
        Self {
            currency_precision: default_currency_precision(),
            allow_cost_center_in_entry_of_bs_account: false,
        }
    }
}

impl AdjustmentSettings {
    /// Load settings from `config/adjustment.toml` and `ADJUSTMENT__*` variables
    pub fn load() -> AdjustmentResult<Self> {
        Self::load_from("config/adjustment")
    }

    /// Load settings from the given file (extension optional) and the environment
    pub fn load_from(path: &str) -> AdjustmentResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ADJUSTMENT").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
