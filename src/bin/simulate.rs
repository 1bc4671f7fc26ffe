//! Drive one escrow lifecycle end to end on a fresh dev chain.
//!
//! Deploys both contracts, then: the seller claims a faucet unit and
//! approves the escrow for it, the transaction id is computed, the seller
//! creates the escrow, and the buyer pays it. Finishes by printing the
//! buyer's resulting token balance.
//!
//! Usage:
//!   cargo run --bin simulate

use std::path::Path;

use alloy_primitives::utils::parse_ether;
use nft_escrow_lab::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    print_header("NFT Escrow Simulation");

    print_step(1, "Loading lab config...");
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("lab-config.json");
    let config = LabConfig::load(&config_path)?;

    print_step(2, "Deriving accounts...");
    let signers = derive_signers(&config.wallets.from_mnemonic, 3)?;
    let (deployer, seller, buyer) = (&signers[0], &signers[1], &signers[2]);
    println!("  Deployer: {}", deployer.address());
    println!("  Seller:   {}", seller.address());
    println!("  Buyer:    {}", buyer.address());

    print_step(3, "Starting dev chain...");
    let chain = DevChain::new();
    for signer in &signers {
        chain.fund(signer.address(), parse_ether("10")?).await;
    }
    println!("  Prefunded {} accounts with 10 ETH each", signers.len());

    print_step(4, "Deploying contracts...");
    let deployment = run_deployment(&chain, deployer, &config).await?;
    println!("  Escrow: {}", deployment.escrow.address());
    println!("  Faucet: {}", deployment.faucet.address());

    print_step(5, "Running escrow lifecycle...");
    let balance = run_simulation(&deployment, seller, buyer, &config).await?;

    print_step(6, "Verifying buyer balance...");
    println!("  Buyer token balance: {balance}");

    println!("\n=== Simulation complete ===\n");
    Ok(())
}
