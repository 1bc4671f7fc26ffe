use alloy_primitives::{keccak256, Address};
use bip32::{DerivationPath, Language, Mnemonic, XPrv};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::thread_rng;

use crate::error::LabError;

/// A signing identity: a secp256k1 key and the address derived from it.
#[derive(Debug, Clone)]
pub struct Signer {
    key: SigningKey,
    address: Address,
}

impl Signer {
    fn from_signing_key(key: SigningKey) -> Self {
        let address = address_of(&key);
        Self { key, address }
    }

    /// Generate a throwaway signer for demos and tests.
    pub fn random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut thread_rng()))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.key
    }
}

/// Address of a key: keccak-256 of the uncompressed public key, last 20 bytes.
fn address_of(key: &SigningKey) -> Address {
    let point = key.verifying_key().to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&digest[12..])
}

/// Derive `count` signers from a BIP-39 phrase at m/44'/60'/0'/0/{index}.
///
/// Index 0 is the deployer, 1 the seller, 2 the buyer. Derivation is
/// deterministic: the same phrase and count always yield the same addresses
/// in the same order.
pub fn derive_signers(phrase: &str, count: u32) -> Result<Vec<Signer>, LabError> {
    let phrase = phrase.trim();
    if phrase.split_whitespace().count() < 12 {
        return Err(LabError::InvalidPhrase("expected 12+ words".into()));
    }
    let mnemonic =
        Mnemonic::new(phrase, Language::English).map_err(|e| LabError::InvalidPhrase(format!("{e}")))?;
    let seed = mnemonic.to_seed("");

    let mut signers = Vec::with_capacity(count as usize);
    for index in 0..count {
        let path: DerivationPath = format!("m/44'/60'/0'/0/{index}")
            .parse()
            .map_err(|e| LabError::Derivation(format!("{e}")))?;
        let xprv = XPrv::derive_from_path(&seed, &path)
            .map_err(|e| LabError::Derivation(format!("{e}")))?;
        signers.push(Signer::from_signing_key(xprv.private_key().clone()));
    }
    Ok(signers)
}
