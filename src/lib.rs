pub mod chain;
pub mod config;
pub mod contracts;
pub mod error;
pub mod scenario;
pub mod signer;

pub use chain::{DevChain, PendingTx};
pub use config::LabConfig;
pub use contracts::{EscrowNft, EscrowRecord, EscrowStatus, EscrowTerms, FaucetNft, TermsBuilder};
pub use error::LabError;
pub use scenario::{run_deployment, run_simulation, Deployment};
pub use signer::{derive_signers, Signer};

pub fn print_header(title: &str) {
    println!("\n=== {} ===\n", title);
}

pub fn print_step(num: usize, description: &str) {
    println!("Step {}: {}", num, description);
}
