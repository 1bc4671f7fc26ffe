pub mod escrow;
pub mod faucet;

pub use escrow::{EscrowNft, EscrowRecord, EscrowStatus, EscrowTerms, TermsBuilder};
pub use faucet::FaucetNft;
