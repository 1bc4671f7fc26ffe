//! Deploy the escrow and faucet contracts to a fresh dev chain.
//!
//! The wallet mnemonic is read from `lab-config.json` in the project root
//! (one JSON object with a `wallets.from_mnemonic` entry). This file is in
//! .gitignore and never committed.
//!
//! Setup:
//!   echo '{"wallets":{"from_mnemonic":"word1 ... word12"}}' > lab-config.json
//!
//! Usage:
//!   cargo run --bin deploy

use std::path::Path;

use alloy_primitives::utils::parse_ether;
use nft_escrow_lab::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    print_header("NFT Escrow Deployment");

    print_step(1, "Loading lab config...");
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("lab-config.json");
    let config = LabConfig::load(&config_path)?;

    print_step(2, "Deriving accounts...");
    let signers = derive_signers(&config.wallets.from_mnemonic, 2)?;
    for (index, signer) in signers.iter().enumerate() {
        println!("  Account {}: {}", index, signer.address());
    }

    print_step(3, "Starting dev chain...");
    let chain = DevChain::new();
    for signer in &signers {
        chain.fund(signer.address(), parse_ether("10")?).await;
    }
    println!("  Prefunded {} accounts with 10 ETH each", signers.len());

    print_step(4, "Deploying contracts...");
    let deployment = run_deployment(&chain, &signers[0], &config).await?;
    println!("  Contract deployed to: {}", deployment.escrow.address());
    println!("  Faucet deployed to:   {}", deployment.faucet.address());

    println!("\n=== Deployment complete ===\n");
    Ok(())
}
