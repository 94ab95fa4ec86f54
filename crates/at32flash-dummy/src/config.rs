//! Emulator configuration

/// Product id of the default emulated part (AT32F403ACGT7, 1 MiB in two regions)
pub const DEFAULT_PRODUCT_ID: u32 = 0x7005_0346;
/// Default amount of scratch RAM offered as working area
pub const DEFAULT_WORKING_AREA: u32 = 32 * 1024;

/// Configuration for the emulated target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyConfig {
    /// Value returned by the product-id register
    pub product_id: u32,
    /// Bytes of RAM available for working areas
    pub working_area_size: u32,
    /// Size of the external SPIM memory, 0 for none
    pub spim_size: u32,
    /// Busy polls reported after each flash operation
    pub busy_polls: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            product_id: DEFAULT_PRODUCT_ID,
            working_area_size: DEFAULT_WORKING_AREA,
            spim_size: 0,
            busy_polls: 1,
        }
    }
}

/// Error type for emulator parameters
#[cfg(feature = "std")]
#[derive(Debug, thiserror::Error)]
pub enum DummyConfigError {
    /// Unknown parameter key
    #[error("unknown dummy parameter '{0}'")]
    UnknownParameter(std::string::String),
    /// Parameter value is not a number
    #[error("invalid value '{value}' for dummy parameter '{key}'")]
    InvalidValue {
        /// Parameter key
        key: std::string::String,
        /// Rejected value
        value: std::string::String,
    },
}

#[cfg(feature = "std")]
impl DummyConfig {
    /// Build a configuration from `key=value` target parameters
    ///
    /// Recognised keys: `pid`, `ram`, `spim_size`, `busy`.
    pub fn from_params(
        params: &std::collections::HashMap<std::string::String, std::string::String>,
    ) -> Result<Self, DummyConfigError> {
        let mut config = Self::default();
        for (key, value) in params {
            let number = at32flash_core::config::parse_number(value).map_err(|_| {
                DummyConfigError::InvalidValue {
                    key: key.clone(),
                    value: value.clone(),
                }
            })?;
            match key.as_str() {
                "pid" => config.product_id = number,
                "ram" => config.working_area_size = number,
                "spim_size" => config.spim_size = number,
                "busy" => config.busy_polls = number,
                _ => return Err(DummyConfigError::UnknownParameter(key.clone())),
            }
        }
        Ok(config)
    }
}
