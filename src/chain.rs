//! In-process dev chain standing in for the test network.
//!
//! One lock guards the whole ledger: block height, native balances, and the
//! registry of deployed contract instances. State-changing calls validate
//! against the target contract, apply atomically, and mine exactly one
//! inclusion block; a failed validation reverts with no state change and no
//! block. Confirmation waits mine the shortfall on demand.

use std::collections::HashMap;
use std::sync::Arc;

use alloy_primitives::{keccak256, Address, B256, U256};
use tokio::sync::Mutex;

use crate::contracts::escrow::EscrowState;
use crate::contracts::faucet::FaucetState;
use crate::error::LabError;

/// Handle to the dev chain. Cheap to clone; all clones share one ledger.
#[derive(Clone)]
pub struct DevChain {
    state: Arc<Mutex<ChainState>>,
}

pub(crate) enum ContractKind {
    Escrow(EscrowState),
    Faucet(FaucetState),
}

pub(crate) struct ChainState {
    height: u64,
    balances: HashMap<Address, U256>,
    contracts: HashMap<Address, ContractKind>,
    deploy_nonce: u64,
    tx_count: u64,
}

impl ChainState {
    pub(crate) fn escrow(&self, address: Address) -> Result<&EscrowState, LabError> {
        match self.contracts.get(&address) {
            Some(ContractKind::Escrow(state)) => Ok(state),
            Some(_) => Err(LabError::Revert(format!(
                "{address} is not an escrow contract"
            ))),
            None => Err(LabError::UnknownContract(address)),
        }
    }

    pub(crate) fn escrow_mut(&mut self, address: Address) -> Result<&mut EscrowState, LabError> {
        match self.contracts.get_mut(&address) {
            Some(ContractKind::Escrow(state)) => Ok(state),
            Some(_) => Err(LabError::Revert(format!(
                "{address} is not an escrow contract"
            ))),
            None => Err(LabError::UnknownContract(address)),
        }
    }

    pub(crate) fn faucet(&self, address: Address) -> Result<&FaucetState, LabError> {
        match self.contracts.get(&address) {
            Some(ContractKind::Faucet(state)) => Ok(state),
            Some(_) => Err(LabError::Revert(format!(
                "{address} is not a faucet contract"
            ))),
            None => Err(LabError::UnknownContract(address)),
        }
    }

    pub(crate) fn faucet_mut(&mut self, address: Address) -> Result<&mut FaucetState, LabError> {
        match self.contracts.get_mut(&address) {
            Some(ContractKind::Faucet(state)) => Ok(state),
            Some(_) => Err(LabError::Revert(format!(
                "{address} is not a faucet contract"
            ))),
            None => Err(LabError::UnknownContract(address)),
        }
    }

    pub(crate) fn balance(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or(U256::ZERO)
    }

    pub(crate) fn require_balance(&self, address: Address, needed: U256) -> Result<(), LabError> {
        let available = self.balance(address);
        if available < needed {
            return Err(LabError::InsufficientFunds { needed, available });
        }
        Ok(())
    }

    pub(crate) fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), LabError> {
        self.require_balance(from, value)?;
        *self.balances.entry(from).or_insert(U256::ZERO) -= value;
        *self.balances.entry(to).or_insert(U256::ZERO) += value;
        Ok(())
    }

    /// Include one transaction: mine a block and hand back its pending handle.
    fn mine(&mut self, chain: &DevChain, from: Address) -> PendingTx {
        self.height += 1;
        self.tx_count += 1;
        let mut preimage = Vec::with_capacity(36);
        preimage.extend_from_slice(from.as_slice());
        preimage.extend_from_slice(&self.height.to_be_bytes());
        preimage.extend_from_slice(&self.tx_count.to_be_bytes());
        PendingTx {
            chain: chain.clone(),
            hash: keccak256(&preimage),
            included_at: self.height,
        }
    }
}

impl DevChain {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChainState {
                height: 0,
                balances: HashMap::new(),
                contracts: HashMap::new(),
                deploy_nonce: 0,
                tx_count: 0,
            })),
        }
    }

    pub async fn height(&self) -> u64 {
        self.state.lock().await.height
    }

    pub async fn balance(&self, address: Address) -> U256 {
        self.state.lock().await.balance(address)
    }

    /// Credit a native balance, the dev-network prefunded-accounts convention.
    pub async fn fund(&self, address: Address, amount: U256) {
        let mut state = self.state.lock().await;
        *state.balances.entry(address).or_insert(U256::ZERO) += amount;
    }

    /// Instantiate a contract. The address is derived from the deployer and
    /// the deploy nonce, so redeploying from the same state yields the same
    /// addresses.
    pub(crate) async fn deploy(
        &self,
        deployer: Address,
        contract: ContractKind,
    ) -> (Address, PendingTx) {
        let mut state = self.state.lock().await;
        let mut preimage = Vec::with_capacity(28);
        preimage.extend_from_slice(deployer.as_slice());
        preimage.extend_from_slice(&state.deploy_nonce.to_be_bytes());
        let digest = keccak256(&preimage);
        let address = Address::from_slice(&digest[12..]);
        state.contracts.insert(address, contract);
        state.deploy_nonce += 1;
        let pending = state.mine(self, deployer);
        (address, pending)
    }

    /// Run a state-changing call. `mutate` must do all of its validation
    /// before touching state so a revert leaves the ledger untouched.
    pub(crate) async fn transact<F>(&self, from: Address, mutate: F) -> Result<PendingTx, LabError>
    where
        F: FnOnce(&mut ChainState) -> Result<(), LabError>,
    {
        let mut state = self.state.lock().await;
        mutate(&mut state)?;
        Ok(state.mine(self, from))
    }

    /// Run a read-only call. Mines nothing.
    pub(crate) async fn view<F, R>(&self, read: F) -> R
    where
        F: FnOnce(&ChainState) -> R,
    {
        let state = self.state.lock().await;
        read(&state)
    }
}

impl Default for DevChain {
    fn default() -> Self {
        Self::new()
    }
}

/// A submitted transaction awaiting confirmations.
pub struct PendingTx {
    chain: DevChain,
    hash: B256,
    included_at: u64,
}

impl PendingTx {
    pub fn hash(&self) -> B256 {
        self.hash
    }

    pub fn included_at(&self) -> u64 {
        self.included_at
    }

    /// Block until `confirmations` blocks have been observed on top of the
    /// inclusion block, mining the shortfall. Returns the confirmations seen.
    pub async fn wait(&self, confirmations: u64) -> u64 {
        let mut state = self.chain.state.lock().await;
        let target = self.included_at + confirmations;
        if state.height < target {
            state.height = target;
        }
        state.height - self.included_at
    }

    pub async fn confirmations(&self) -> u64 {
        self.chain.state.lock().await.height - self.included_at
    }
}

impl std::fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTx")
            .field("hash", &self.hash)
            .field("included_at", &self.included_at)
            .finish()
    }
}
