//! Typed client for the faucet NFT contract: claimable token units with
//! per-unit approvals and balance queries.

use std::collections::HashMap;

use alloy_primitives::Address;

use crate::chain::{ContractKind, DevChain, PendingTx};
use crate::error::LabError;
use crate::signer::Signer;

pub(crate) struct FaucetState {
    next_unit: u64,
    owners: HashMap<u64, Address>,
    balances: HashMap<Address, u64>,
    approvals: HashMap<u64, Address>,
}

impl FaucetState {
    pub(crate) fn new() -> Self {
        Self {
            next_unit: 0,
            owners: HashMap::new(),
            balances: HashMap::new(),
            approvals: HashMap::new(),
        }
    }

    /// Mint the next sequential unit to the caller.
    pub(crate) fn claim(&mut self, caller: Address) -> u64 {
        let unit = self.next_unit;
        self.next_unit += 1;
        self.owners.insert(unit, caller);
        *self.balances.entry(caller).or_insert(0) += 1;
        unit
    }

    pub(crate) fn approve(
        &mut self,
        caller: Address,
        spender: Address,
        unit: u64,
    ) -> Result<(), LabError> {
        match self.owners.get(&unit) {
            Some(owner) if *owner == caller => {
                self.approvals.insert(unit, spender);
                Ok(())
            }
            Some(_) => Err(LabError::Revert(
                "faucet: caller does not own token unit".into(),
            )),
            None => Err(LabError::Revert("faucet: unknown token unit".into())),
        }
    }

    /// Move a unit on behalf of its owner. Consumes the approval.
    pub(crate) fn transfer_from(
        &mut self,
        operator: Address,
        from: Address,
        to: Address,
        unit: u64,
    ) -> Result<(), LabError> {
        match self.owners.get(&unit) {
            Some(owner) if *owner == from => {}
            Some(_) => {
                return Err(LabError::Revert(
                    "faucet: from address does not own token unit".into(),
                ))
            }
            None => return Err(LabError::Revert("faucet: unknown token unit".into())),
        }
        if self.approvals.get(&unit) != Some(&operator) {
            return Err(LabError::Revert("faucet: transfer not approved".into()));
        }
        self.approvals.remove(&unit);
        self.owners.insert(unit, to);
        if let Some(balance) = self.balances.get_mut(&from) {
            *balance -= 1;
        }
        *self.balances.entry(to).or_insert(0) += 1;
        Ok(())
    }

    pub(crate) fn balance_of(&self, owner: Address) -> u64 {
        self.balances.get(&owner).copied().unwrap_or(0)
    }

    pub(crate) fn owner_of(&self, unit: u64) -> Option<Address> {
        self.owners.get(&unit).copied()
    }

    pub(crate) fn approved(&self, unit: u64) -> Option<Address> {
        self.approvals.get(&unit).copied()
    }
}

/// Client handle for one deployed faucet instance.
#[derive(Clone)]
pub struct FaucetNft {
    chain: DevChain,
    address: Address,
}

impl FaucetNft {
    /// Deploy a fresh faucet. Takes no constructor arguments.
    pub async fn deploy(chain: &DevChain, from: &Signer) -> (Self, PendingTx) {
        let (address, pending) = chain
            .deploy(from.address(), ContractKind::Faucet(FaucetState::new()))
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

    /// The faucet() entry point: mint the next unit to the caller. The first
    /// claim mints unit 0.
    pub async fn claim(&self, from: &Signer) -> Result<PendingTx, LabError> {
        let address = self.address;
        let caller = from.address();
        self.chain
            .transact(caller, move |state| {
                state.faucet_mut(address)?.claim(caller);
                Ok(())
            })
            .await
    }

    /// Authorize `spender` to move `unit`. Only the unit's owner may approve.
    pub async fn approve(
        &self,
        from: &Signer,
        spender: Address,
        unit: u64,
    ) -> Result<PendingTx, LabError> {
        let address = self.address;
        let caller = from.address();
        self.chain
            .transact(caller, move |state| {
                state.faucet_mut(address)?.approve(caller, spender, unit)
            })
            .await
    }

    pub async fn balance_of(&self, owner: Address) -> Result<u64, LabError> {
        self.chain
            .view(|state| state.faucet(self.address).map(|f| f.balance_of(owner)))
            .await
    }

    pub async fn owner_of(&self, unit: u64) -> Result<Option<Address>, LabError> {
        self.chain
            .view(|state| state.faucet(self.address).map(|f| f.owner_of(unit)))
            .await
    }

    pub async fn approved(&self, unit: u64) -> Result<Option<Address>, LabError> {
        self.chain
            .view(|state| state.faucet(self.address).map(|f| f.approved(unit)))
            .await
    }
}
