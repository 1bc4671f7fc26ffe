//! Lab configuration: a wallets section holding the mnemonic and an escrow
//! section with the deployment knobs.

use std::path::Path;

use alloy_primitives::utils::parse_ether;
use alloy_primitives::U256;
use serde::Deserialize;

use crate::error::LabError;

#[derive(Debug, Clone, Deserialize)]
pub struct LabConfig {
    pub wallets: Wallets,
    #[serde(default)]
    pub escrow: EscrowSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wallets {
    pub from_mnemonic: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EscrowSettings {
    /// Constructor argument for the escrow contract. Passed through verbatim;
    /// the contract does not document its meaning.
    #[serde(default = "default_constructor_value")]
    pub constructor_value: u64,
    /// Escrow price as a decimal ether string.
    #[serde(default = "default_price_ether")]
    pub price_ether: String,
    /// Blocks to wait after each state-changing transaction.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
}

fn default_constructor_value() -> u64 {
    2
}

fn default_price_ether() -> String {
    "0.5".to_string()
}

fn default_confirmations() -> u64 {
    3
}

impl Default for EscrowSettings {
    fn default() -> Self {
        Self {
            constructor_value: default_constructor_value(),
            price_ether: default_price_ether(),
            confirmations: default_confirmations(),
        }
    }
}

impl LabConfig {
    /// Load and validate the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LabError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LabError::Config(format!(
                "no config file at {}\n  Create it with: echo '{{\"wallets\":{{\"from_mnemonic\":\"word1 ... word12\"}}}}' > lab-config.json",
                path.display()
            )));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LabError> {
        let config: Self = serde_json::from_str(json)?;
        if config.wallets.from_mnemonic.split_whitespace().count() < 12 {
            return Err(LabError::Config(
                "wallets.from_mnemonic must hold 12+ words".into(),
            ));
        }
        Ok(config)
    }

    /// The escrow price in wei.
    pub fn price(&self) -> Result<U256, LabError> {
        parse_ether(&self.escrow.price_ether).map_err(|e| {
            LabError::Config(format!(
                "bad escrow.price_ether \"{}\": {e}",
                self.escrow.price_ether
            ))
        })
    }
}
