//! Machine configuration.

use serde::{Deserialize, Serialize};

use crate::bits::Bits;
use crate::error::{Error, Result};

/// Sizing knobs for [`Computer`](super::Computer).
///
/// ```rust
/// use bitsim_core::cpu::ComputerConfig;
///
/// let config = ComputerConfig::from_json(r#"{ "ram_size": 64 }"#).unwrap();
/// assert_eq!(config.ram_size, 64);
/// assert_eq!(config.micro_steps, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComputerConfig {
    /// Number of 16-bit RAM words. The address bus is 8 bits wide.
    pub ram_size: usize,
    /// Width of the microstep counter.
    pub micro_counter_bits: usize,
    /// Outputs of the step decoder. The counter wraps to 0 after reaching
    /// this value.
    pub micro_steps: usize,
}

impl Default for ComputerConfig {
    fn default() -> Self {
        Self {
            ram_size: 256,
            micro_counter_bits: 4,
            micro_steps: 5,
        }
    }
}

impl ComputerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=256).contains(&self.ram_size) {
            return Err(Error::Config(format!(
                "ram_size must be between 1 and 256, got {}",
                self.ram_size
            )));
        }
        if !(1..=8).contains(&self.micro_counter_bits) {
            return Err(Error::Config(format!(
                "micro_counter_bits must be between 1 and 8, got {}",
                self.micro_counter_bits
            )));
        }
        // Fetch takes two steps; the counter must also be able to hold the
        // last step before it wraps.
        if self.micro_steps < 2 {
            return Err(Error::Config(format!(
                "micro_steps must be at least 2, got {}",
                self.micro_steps
            )));
        }
        // The step decoder has one output per step.
        if self.micro_steps > Bits::MAX_WIDTH {
            return Err(Error::Config(format!(
                "micro_steps must be at most {}, got {}",
                Bits::MAX_WIDTH,
                self.micro_steps
            )));
        }
        if self.micro_steps >= 1 << self.micro_counter_bits {
            return Err(Error::Config(format!(
                "a {}-bit counter cannot reach step {}",
                self.micro_counter_bits, self.micro_steps
            )));
        }
        Ok(())
    }
}
