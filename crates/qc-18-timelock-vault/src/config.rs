//! # Vault Configuration
//!
//! Initial fee schedule, owner, and hard limits.
//!
//! ## Security Requirements
//!
//! - `owner` MUST NOT be the zero address
//! - All limits have sane defaults with override capability

use crate::domain::{Address, FeeSchedule, ZERO_ADDRESS};
use std::env;
use thiserror::Error;

/// Ten years in seconds.
pub const DEFAULT_MAX_LOCK_DURATION_SECS: u64 = 10 * 365 * 24 * 3600;

/// 64 KiB.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Owner is not set (zero value).
    #[error("Owner is the zero address. Set QC_VAULT_OWNER or provide in config.")]
    ZeroOwner,

    /// Minimum lock duration exceeds the maximum.
    #[error("Minimum lock duration {min}s exceeds maximum {max}s")]
    LockBounds {
        /// Configured minimum
        min: u64,
        /// Configured maximum
        max: u64,
    },

    /// Payload limit of zero would reject every message.
    #[error("max_payload_bytes must be positive")]
    ZeroPayloadLimit,

    /// Environment variable could not be parsed.
    #[error("Invalid value for {var}: {value}")]
    InvalidEnv {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },
}

/// Vault configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultConfig {
    /// Initial owner. MUST be overridden.
    pub owner: Address,
    /// Initial flat fee.
    pub base_fee: u64,
    /// Initial minimum lock duration in seconds.
    pub min_lock_duration_secs: u64,
    /// Upper bound for lock durations and for the minimum.
    pub max_lock_duration_secs: u64,
    /// Upper bound for payload size.
    pub max_payload_bytes: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            owner: ZERO_ADDRESS, // MUST be overridden
            base_fee: 1,
            min_lock_duration_secs: 60,
            max_lock_duration_secs: DEFAULT_MAX_LOCK_DURATION_SECS,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl VaultConfig {
    /// Default limits with the given owner.
    pub fn with_owner(owner: Address) -> Self {
        Self {
            owner,
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_VAULT_OWNER`: Owner address, 40 hex chars (required)
    /// - `QC_VAULT_BASE_FEE`: Flat fee (default: 1)
    /// - `QC_VAULT_MIN_LOCK_SECS`: Minimum lock duration (default: 60)
    /// - `QC_VAULT_MAX_LOCK_SECS`: Maximum lock duration (default: 10 years)
    /// - `QC_VAULT_MAX_PAYLOAD_BYTES`: Payload limit (default: 65536)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let owner = match env::var("QC_VAULT_OWNER") {
            Ok(raw) => parse_address(&raw).ok_or(ConfigError::InvalidEnv {
                var: "QC_VAULT_OWNER",
                value: raw,
            })?,
            Err(_) => defaults.owner,
        };

        let config = Self {
            owner,
            base_fee: parse_env("QC_VAULT_BASE_FEE", defaults.base_fee)?,
            min_lock_duration_secs: parse_env(
                "QC_VAULT_MIN_LOCK_SECS",
                defaults.min_lock_duration_secs,
            )?,
            max_lock_duration_secs: parse_env(
                "QC_VAULT_MAX_LOCK_SECS",
                defaults.max_lock_duration_secs,
            )?,
            max_payload_bytes: parse_env("QC_VAULT_MAX_PAYLOAD_BYTES", defaults.max_payload_bytes)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - owner is the zero address
    /// - the minimum lock duration exceeds the maximum
    /// - the payload limit is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner == ZERO_ADDRESS {
            return Err(ConfigError::ZeroOwner);
        }
        if self.min_lock_duration_secs > self.max_lock_duration_secs {
            return Err(ConfigError::LockBounds {
                min: self.min_lock_duration_secs,
                max: self.max_lock_duration_secs,
            });
        }
        if self.max_payload_bytes == 0 {
            return Err(ConfigError::ZeroPayloadLimit);
        }
        Ok(())
    }

    /// Initial fee schedule.
    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.base_fee, self.min_lock_duration_secs)
    }
}

fn parse_address(raw: &str) -> Option<Address> {
    let bytes = hex::decode(raw.trim().trim_start_matches("0x")).ok()?;
    bytes.try_into().ok()
}

fn parse_env<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var, value: raw }),
        Err(_) => Ok(default),
    }
}
