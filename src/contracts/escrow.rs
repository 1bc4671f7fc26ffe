//! Typed client for the escrow NFT contract.
//!
//! Records are keyed by a deterministic transaction id and move through a
//! two-state lifecycle: created pending by the seller, paid once by the
//! named buyer. An unpaid record stays pending indefinitely; there is no
//! timeout or cancellation path.

use std::collections::HashMap;

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::chain::{ContractKind, DevChain, PendingTx};
use crate::error::LabError;
use crate::signer::Signer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscrowStatus {
    Pending,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscrowRecord {
    pub token: Address,
    pub token_unit: u64,
    pub price: U256,
    pub seller: Address,
    pub buyer: Address,
    pub status: EscrowStatus,
}

pub(crate) struct EscrowState {
    /// Opaque constructor argument, stored but not interpreted.
    pub(crate) constructor_value: u64,
    pub(crate) records: HashMap<B256, EscrowRecord>,
}

impl EscrowState {
    pub(crate) fn new(constructor_value: u64) -> Self {
        Self {
            constructor_value,
            records: HashMap::new(),
        }
    }
}

/// Parameters for createEscrow.
#[derive(Debug, Clone)]
pub struct EscrowTerms {
    pub tx_id: B256,
    pub token_unit: u64,
    pub price: U256,
    pub token: Address,
    pub buyer: Address,
}

/// Builder for escrow terms. Rejects incomplete or zero-price terms before
/// anything touches the chain.
#[derive(Debug, Default)]
pub struct TermsBuilder {
    tx_id: Option<B256>,
    token_unit: Option<u64>,
    price: Option<U256>,
    token: Option<Address>,
    buyer: Option<Address>,
}

impl TermsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tx_id(mut self, tx_id: B256) -> Self {
        self.tx_id = Some(tx_id);
        self
    }

    /// Defaults to unit 0, the first unit the faucet mints.
    pub fn token_unit(mut self, unit: u64) -> Self {
        self.token_unit = Some(unit);
        self
    }

    pub fn price(mut self, price: U256) -> Self {
        self.price = Some(price);
        self
    }

    pub fn token(mut self, token: Address) -> Self {
        self.token = Some(token);
        self
    }

    pub fn buyer(mut self, buyer: Address) -> Self {
        self.buyer = Some(buyer);
        self
    }

    pub fn build(self) -> Result<EscrowTerms, LabError> {
        let tx_id = self
            .tx_id
            .ok_or_else(|| LabError::InvalidTerms("transaction id required".into()))?;
        let token = self
            .token
            .ok_or_else(|| LabError::InvalidTerms("token contract required".into()))?;
        let buyer = self
            .buyer
            .ok_or_else(|| LabError::InvalidTerms("buyer address required".into()))?;
        let price = self
            .price
            .ok_or_else(|| LabError::InvalidTerms("price required".into()))?;
        if price.is_zero() {
            return Err(LabError::InvalidTerms("price must be > 0".into()));
        }
        Ok(EscrowTerms {
            tx_id,
            token_unit: self.token_unit.unwrap_or(0),
            price,
            token,
            buyer,
        })
    }
}

/// Client handle for one deployed escrow instance.
#[derive(Clone)]
pub struct EscrowNft {
    chain: DevChain,
    address: Address,
}

impl EscrowNft {
    /// Deploy a fresh escrow contract. `constructor_value` is passed through
    /// verbatim; the contract does not document its meaning.
    pub async fn deploy(
        chain: &DevChain,
        from: &Signer,
        constructor_value: u64,
    ) -> (Self, PendingTx) {
        let (address, pending) = chain
            .deploy(
                from.address(),
                ContractKind::Escrow(EscrowState::new(constructor_value)),
            )
            .await;
        (
            Self {
                chain: chain.clone(),
                address,
            },
            pending,
        )
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn constructor_value(&self) -> Result<u64, LabError> {
        self.chain
            .view(|state| state.escrow(self.address).map(|e| e.constructor_value))
            .await
    }

    /// The generateTxId view call: the deterministic primary key for an
    /// escrow record. The create and pay calls must use an id computed from
    /// the same four inputs or they will address different records.
    pub fn generate_tx_id(
        &self,
        seller: Address,
        buyer: Address,
        token: Address,
        salt: B256,
    ) -> B256 {
        let mut preimage = Vec::with_capacity(20 * 3 + 32);
        preimage.extend_from_slice(seller.as_slice());
        preimage.extend_from_slice(buyer.as_slice());
        preimage.extend_from_slice(token.as_slice());
        preimage.extend_from_slice(salt.as_slice());
        keccak256(&preimage)
    }

    /// Open a pending escrow record. The caller is recorded as the seller
    /// and must own the token unit and have approved this contract for it.
    pub async fn create_escrow(
        &self,
        from: &Signer,
        terms: &EscrowTerms,
    ) -> Result<PendingTx, LabError> {
        let address = self.address;
        let seller = from.address();
        let terms = terms.clone();
        self.chain
            .transact(seller, move |state| {
                if terms.price.is_zero() {
                    return Err(LabError::Revert("escrow: price must be > 0".into()));
                }
                let faucet = state.faucet(terms.token)?;
                if faucet.owner_of(terms.token_unit) != Some(seller) {
                    return Err(LabError::Revert(
                        "escrow: caller does not own token unit".into(),
                    ));
                }
                if faucet.approved(terms.token_unit) != Some(address) {
                    return Err(LabError::Revert(
                        "escrow: token unit not approved for escrow".into(),
                    ));
                }
                let escrow = state.escrow_mut(address)?;
                if escrow.records.contains_key(&terms.tx_id) {
                    return Err(LabError::Revert(
                        "escrow: transaction id already exists".into(),
                    ));
                }
                escrow.records.insert(
                    terms.tx_id,
                    EscrowRecord {
                        token: terms.token,
                        token_unit: terms.token_unit,
                        price: terms.price,
                        seller,
                        buyer: terms.buyer,
                        status: EscrowStatus::Pending,
                    },
                );
                Ok(())
            })
            .await
    }

    /// The payable payEscrow entry point. The attached value must equal the
    /// recorded price and the caller must be the named buyer. On success the
    /// token unit moves to the buyer, the payment to the seller, and the
    /// record flips to paid; a record pays out exactly once.
    pub async fn pay_escrow(
        &self,
        from: &Signer,
        tx_id: B256,
        value: U256,
    ) -> Result<PendingTx, LabError> {
        let address = self.address;
        let caller = from.address();
        self.chain
            .transact(caller, move |state| {
                let record = state
                    .escrow(address)?
                    .records
                    .get(&tx_id)
                    .cloned()
                    .ok_or_else(|| LabError::Revert("escrow: unknown transaction id".into()))?;
                if record.status == EscrowStatus::Paid {
                    return Err(LabError::Revert("escrow: already paid".into()));
                }
                if caller != record.buyer {
                    return Err(LabError::Revert("escrow: caller is not the buyer".into()));
                }
                if value != record.price {
                    return Err(LabError::Revert("escrow: payment must equal price".into()));
                }
                state.require_balance(caller, value)?;
                state.faucet_mut(record.token)?.transfer_from(
                    address,
                    record.seller,
                    caller,
                    record.token_unit,
                )?;
                state.transfer_native(caller, record.seller, value)?;
                if let Some(stored) = state.escrow_mut(address)?.records.get_mut(&tx_id) {
                    stored.status = EscrowStatus::Paid;
                }
                Ok(())
            })
            .await
    }

    pub async fn escrow_of(&self, tx_id: B256) -> Result<Option<EscrowRecord>, LabError> {
        self.chain
            .view(|state| {
                state
                    .escrow(self.address)
                    .map(|e| e.records.get(&tx_id).cloned())
            })
            .await
    }
}
