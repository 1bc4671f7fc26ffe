use std::fmt;

use alloy_primitives::{Address, U256};

#[derive(Debug)]
pub enum LabError {
    InvalidPhrase(String),
    Derivation(String),
    Config(String),
    InvalidTerms(String),
    Revert(String),
    UnknownContract(Address),
    InsufficientFunds { needed: U256, available: U256 },
}

impl fmt::Display for LabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPhrase(e) => write!(f, "invalid mnemonic phrase: {e}"),
            Self::Derivation(e) => write!(f, "key derivation error: {e}"),
            Self::Config(e) => write!(f, "config error: {e}"),
            Self::InvalidTerms(e) => write!(f, "invalid escrow terms: {e}"),
            Self::Revert(reason) => write!(f, "transaction reverted: {reason}"),
            Self::UnknownContract(addr) => write!(f, "no contract deployed at {addr}"),
            Self::InsufficientFunds { needed, available } => {
                write!(
                    f,
                    "insufficient funds: need {needed} wei, have {available}"
                )
            }
        }
    }
}

impl std::error::Error for LabError {}

impl From<std::io::Error> for LabError {
    fn from(e: std::io::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<serde_json::Error> for LabError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
