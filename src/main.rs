//! NFT Escrow Lab
//!
//! Lab project for driving an NFT escrow + faucet contract pair on an
//! in-process dev chain.
//!
//! ## Goals
//! - Exercise the escrow transaction lifecycle (claim, approve, create, pay)
//! - Keep contract interaction behind statically-typed clients
//! - Wait for probabilistic finality after every state-changing call
//!
//! ## Running
//! ```bash
//! cargo run --bin deploy
//! cargo run --bin simulate
//! ```

fn main() {
    println!("NFT Escrow Lab");
    println!("==============");
    println!();
    println!("Run the binaries to drive the demo flows:");
    println!("  cargo run --bin deploy");
    println!("  cargo run --bin simulate");
}
