//! The two scripted flows: contract deployment and the escrow simulation.
//!
//! Both are strictly sequential call-and-wait sequences; every
//! state-changing call blocks for the configured confirmations before the
//! next call issues. Failures propagate immediately, no retries.

use alloy_primitives::keccak256;

use crate::chain::DevChain;
use crate::config::LabConfig;
use crate::contracts::{EscrowNft, FaucetNft, TermsBuilder};
use crate::error::LabError;
use crate::signer::Signer;

/// Handles for the two deployed contracts, passed explicitly from the
/// deployment flow into the simulation.
pub struct Deployment {
    pub escrow: EscrowNft,
    pub faucet: FaucetNft,
}

/// Deploy the escrow contract (with the configured constructor argument)
/// and the faucet, waiting the configured confirmations after each.
pub async fn run_deployment(
    chain: &DevChain,
    deployer: &Signer,
    config: &LabConfig,
) -> Result<Deployment, LabError> {
    let confirmations = config.escrow.confirmations;

    let (escrow, pending) =
        EscrowNft::deploy(chain, deployer, config.escrow.constructor_value).await;
    pending.wait(confirmations).await;

    let (faucet, pending) = FaucetNft::deploy(chain, deployer).await;
    pending.wait(confirmations).await;

    Ok(Deployment { escrow, faucet })
}

/// Drive one escrow lifecycle and return the buyer's resulting token
/// balance: the seller claims a faucet unit and approves the escrow for it,
/// the transaction id is computed, the seller creates the escrow, and the
/// buyer pays it.
pub async fn run_simulation(
    deployment: &Deployment,
    seller: &Signer,
    buyer: &Signer,
    config: &LabConfig,
) -> Result<u64, LabError> {
    let Deployment { escrow, faucet } = deployment;
    let confirmations = config.escrow.confirmations;
    let price = config.price()?;

    // First claim mints unit 0; the rest of the flow trades that unit.
    let pending = faucet.claim(seller).await?;
    pending.wait(confirmations).await;
    println!("  Seller claimed token unit 0");

    let pending = faucet.approve(seller, escrow.address(), 0).await?;
    pending.wait(confirmations).await;
    println!("  Escrow approved for token unit 0");

    let salt = keccak256(b"test");
    let tx_id = escrow.generate_tx_id(seller.address(), buyer.address(), faucet.address(), salt);
    println!("  Transaction id: {tx_id}");

    let terms = TermsBuilder::new()
        .tx_id(tx_id)
        .token_unit(0)
        .price(price)
        .token(faucet.address())
        .buyer(buyer.address())
        .build()?;
    let pending = escrow.create_escrow(seller, &terms).await?;
    pending.wait(confirmations).await;
    println!("  Escrow created (pending)");

    let pending = escrow.pay_escrow(buyer, tx_id, price).await?;
    pending.wait(confirmations).await;
    println!("  Escrow paid");

    let balance = faucet.balance_of(buyer.address()).await?;
    Ok(balance)
}
