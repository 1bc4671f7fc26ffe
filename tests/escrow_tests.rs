//! Integration tests for the escrow and faucet contract clients.
//!
//! Each test drives the dev chain directly, mirroring the simulate binary.

use alloy_primitives::{keccak256, utils::parse_ether, B256, U256};
use nft_escrow_lab::*;

struct Lab {
    chain: DevChain,
    escrow: EscrowNft,
    faucet: FaucetNft,
    seller: Signer,
    buyer: Signer,
}

async fn setup() -> Lab {
    let chain = DevChain::new();
    let deployer = Signer::random();
    let seller = Signer::random();
    let buyer = Signer::random();
    for signer in [&deployer, &seller, &buyer] {
        chain
            .fund(signer.address(), parse_ether("10").unwrap())
            .await;
    }
    let (escrow, _) = EscrowNft::deploy(&chain, &deployer, 2).await;
    let (faucet, _) = FaucetNft::deploy(&chain, &deployer).await;
    Lab {
        chain,
        escrow,
        faucet,
        seller,
        buyer,
    }
}

fn price() -> U256 {
    parse_ether("0.5").unwrap()
}

fn demo_terms(lab: &Lab, tx_id: B256) -> EscrowTerms {
    TermsBuilder::new()
        .tx_id(tx_id)
        .token_unit(0)
        .price(price())
        .token(lab.faucet.address())
        .buyer(lab.buyer.address())
        .build()
        .unwrap()
}

fn demo_tx_id(lab: &Lab) -> B256 {
    lab.escrow.generate_tx_id(
        lab.seller.address(),
        lab.buyer.address(),
        lab.faucet.address(),
        keccak256(b"test"),
    )
}

/// Claim unit 0, approve the escrow for it, create the record.
async fn create_demo_escrow(lab: &Lab) -> B256 {
    lab.faucet.claim(&lab.seller).await.unwrap();
    lab.faucet
        .approve(&lab.seller, lab.escrow.address(), 0)
        .await
        .unwrap();
    let tx_id = demo_tx_id(lab);
    lab.escrow
        .create_escrow(&lab.seller, &demo_terms(lab, tx_id))
        .await
        .unwrap();
    tx_id
}

// ---------------------------------------------------------------------------
// Faucet units
// ---------------------------------------------------------------------------

mod faucet_units {
    use super::*;

    #[tokio::test]
    async fn claim_mints_sequential_units() {
        let lab = setup().await;
        lab.faucet.claim(&lab.seller).await.unwrap();
        lab.faucet.claim(&lab.buyer).await.unwrap();

        assert_eq!(
            lab.faucet.owner_of(0).await.unwrap(),
            Some(lab.seller.address())
        );
        assert_eq!(
            lab.faucet.owner_of(1).await.unwrap(),
            Some(lab.buyer.address())
        );
        assert_eq!(lab.faucet.balance_of(lab.seller.address()).await.unwrap(), 1);
        assert_eq!(lab.faucet.balance_of(lab.buyer.address()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn approve_requires_ownership() {
        let lab = setup().await;
        lab.faucet.claim(&lab.seller).await.unwrap();

        let result = lab.faucet.approve(&lab.buyer, lab.escrow.address(), 0).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not own"));
    }

    #[tokio::test]
    async fn approve_unknown_unit_fails() {
        let lab = setup().await;
        let result = lab.faucet.approve(&lab.seller, lab.escrow.address(), 7).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown token unit"));
    }

    #[tokio::test]
    async fn approve_sets_operator() {
        let lab = setup().await;
        lab.faucet.claim(&lab.seller).await.unwrap();
        lab.faucet
            .approve(&lab.seller, lab.escrow.address(), 0)
            .await
            .unwrap();

        assert_eq!(
            lab.faucet.approved(0).await.unwrap(),
            Some(lab.escrow.address())
        );
    }

    #[tokio::test]
    async fn balance_of_unknown_account_is_zero() {
        let lab = setup().await;
        assert_eq!(
            lab.faucet
                .balance_of(Signer::random().address())
                .await
                .unwrap(),
            0
        );
    }
}

// ---------------------------------------------------------------------------
// createEscrow
// ---------------------------------------------------------------------------

mod create_escrow {
    use super::*;

    #[tokio::test]
    async fn records_pending_escrow() {
        let lab = setup().await;
        let tx_id = create_demo_escrow(&lab).await;

        let record = lab.escrow.escrow_of(tx_id).await.unwrap().unwrap();
        assert_eq!(record.status, EscrowStatus::Pending);
        assert_eq!(record.token, lab.faucet.address());
        assert_eq!(record.token_unit, 0);
        assert_eq!(record.price, price());
        assert_eq!(record.seller, lab.seller.address());
        assert_eq!(record.buyer, lab.buyer.address());
    }

    #[tokio::test]
    async fn requires_approval() {
        let lab = setup().await;
        lab.faucet.claim(&lab.seller).await.unwrap();

        let result = lab
            .escrow
            .create_escrow(&lab.seller, &demo_terms(&lab, demo_tx_id(&lab)))
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not approved"));
    }

    #[tokio::test]
    async fn requires_unit_ownership() {
        let lab = setup().await;
        lab.faucet.claim(&lab.seller).await.unwrap();
        lab.faucet
            .approve(&lab.seller, lab.escrow.address(), 0)
            .await
            .unwrap();

        // The buyer does not own unit 0 and cannot open an escrow over it.
        let result = lab
            .escrow
            .create_escrow(&lab.buyer, &demo_terms(&lab, demo_tx_id(&lab)))
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not own"));
    }

    #[tokio::test]
    async fn duplicate_id_rejected() {
        let lab = setup().await;
        let tx_id = create_demo_escrow(&lab).await;

        // Re-approve so only the duplicate id can be the failure.
        lab.faucet
            .approve(&lab.seller, lab.escrow.address(), 0)
            .await
            .unwrap();
        let result = lab
            .escrow
            .create_escrow(&lab.seller, &demo_terms(&lab, tx_id))
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn token_must_be_a_deployed_contract() {
        let lab = setup().await;
        lab.faucet.claim(&lab.seller).await.unwrap();

        let terms = TermsBuilder::new()
            .tx_id(demo_tx_id(&lab))
            .price(price())
            .token(Signer::random().address())
            .buyer(lab.buyer.address())
            .build()
            .unwrap();
        let result = lab.escrow.create_escrow(&lab.seller, &terms).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("no contract deployed")
        );
    }
}

// ---------------------------------------------------------------------------
// payEscrow
// ---------------------------------------------------------------------------

mod pay_escrow {
    use super::*;

    #[tokio::test]
    async fn lifecycle_releases_unit_and_payment() {
        let lab = setup().await;
        let tx_id = create_demo_escrow(&lab).await;

        let seller_before = lab.chain.balance(lab.seller.address()).await;
        let buyer_before = lab.chain.balance(lab.buyer.address()).await;

        lab.escrow
            .pay_escrow(&lab.buyer, tx_id, price())
            .await
            .unwrap();

        let record = lab.escrow.escrow_of(tx_id).await.unwrap().unwrap();
        assert_eq!(record.status, EscrowStatus::Paid);

        // Token unit moved to the buyer and the approval was consumed.
        assert_eq!(
            lab.faucet.owner_of(0).await.unwrap(),
            Some(lab.buyer.address())
        );
        assert_eq!(lab.faucet.approved(0).await.unwrap(), None);
        assert_eq!(lab.faucet.balance_of(lab.buyer.address()).await.unwrap(), 1);
        assert_eq!(lab.faucet.balance_of(lab.seller.address()).await.unwrap(), 0);

        // Payment moved from buyer to seller.
        assert_eq!(
            lab.chain.balance(lab.seller.address()).await,
            seller_before + price()
        );
        assert_eq!(
            lab.chain.balance(lab.buyer.address()).await,
            buyer_before - price()
        );
    }

    #[tokio::test]
    async fn unknown_id_reverts_without_state_change() {
        let lab = setup().await;
        let height_before = lab.chain.height().await;
        let buyer_before = lab.chain.balance(lab.buyer.address()).await;

        let result = lab
            .escrow
            .pay_escrow(&lab.buyer, keccak256(b"never created"), price())
            .await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("unknown transaction id")
        );

        // A reverted call mines nothing and moves nothing.
        assert_eq!(lab.chain.height().await, height_before);
        assert_eq!(lab.chain.balance(lab.buyer.address()).await, buyer_before);
    }

    #[tokio::test]
    async fn only_named_buyer_can_pay() {
        let lab = setup().await;
        let tx_id = create_demo_escrow(&lab).await;

        let outsider = Signer::random();
        lab.chain
            .fund(outsider.address(), parse_ether("10").unwrap())
            .await;
        let result = lab.escrow.pay_escrow(&outsider, tx_id, price()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not the buyer"));
    }

    #[tokio::test]
    async fn wrong_value_rejected() {
        let lab = setup().await;
        let tx_id = create_demo_escrow(&lab).await;

        let result = lab
            .escrow
            .pay_escrow(&lab.buyer, tx_id, price() + U256::from(1u64))
            .await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("equal price"));

        let record = lab.escrow.escrow_of(tx_id).await.unwrap().unwrap();
        assert_eq!(record.status, EscrowStatus::Pending);
    }

    #[tokio::test]
    async fn double_pay_rejected() {
        let lab = setup().await;
        let tx_id = create_demo_escrow(&lab).await;

        lab.escrow
            .pay_escrow(&lab.buyer, tx_id, price())
            .await
            .unwrap();
        let result = lab.escrow.pay_escrow(&lab.buyer, tx_id, price()).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("already paid"));
    }

    #[tokio::test]
    async fn unfunded_buyer_rejected() {
        let chain = DevChain::new();
        let deployer = Signer::random();
        let seller = Signer::random();
        let buyer = Signer::random();
        chain.fund(seller.address(), parse_ether("1").unwrap()).await;

        let (escrow, _) = EscrowNft::deploy(&chain, &deployer, 2).await;
        let (faucet, _) = FaucetNft::deploy(&chain, &deployer).await;
        faucet.claim(&seller).await.unwrap();
        faucet.approve(&seller, escrow.address(), 0).await.unwrap();

        let tx_id = escrow.generate_tx_id(
            seller.address(),
            buyer.address(),
            faucet.address(),
            keccak256(b"test"),
        );
        let terms = TermsBuilder::new()
            .tx_id(tx_id)
            .price(price())
            .token(faucet.address())
            .buyer(buyer.address())
            .build()
            .unwrap();
        escrow.create_escrow(&seller, &terms).await.unwrap();

        let result = escrow.pay_escrow(&buyer, tx_id, price()).await;
        assert!(matches!(
            result,
            Err(LabError::InsufficientFunds { .. })
        ));
    }
}

// ---------------------------------------------------------------------------
// Transaction ids
// ---------------------------------------------------------------------------

mod transaction_ids {
    use super::*;

    #[tokio::test]
    async fn deterministic_in_all_inputs() {
        let lab = setup().await;
        assert_eq!(demo_tx_id(&lab), demo_tx_id(&lab));
    }

    #[tokio::test]
    async fn sensitive_to_each_input() {
        let lab = setup().await;
        let base = demo_tx_id(&lab);
        let other = Signer::random().address();
        let salt = keccak256(b"test");

        let varied = [
            lab.escrow
                .generate_tx_id(other, lab.buyer.address(), lab.faucet.address(), salt),
            lab.escrow
                .generate_tx_id(lab.seller.address(), other, lab.faucet.address(), salt),
            lab.escrow
                .generate_tx_id(lab.seller.address(), lab.buyer.address(), other, salt),
            lab.escrow.generate_tx_id(
                lab.seller.address(),
                lab.buyer.address(),
                lab.faucet.address(),
                keccak256(b"other"),
            ),
        ];
        for id in varied {
            assert_ne!(id, base);
        }
    }

    #[tokio::test]
    async fn mismatched_salt_targets_missing_record() {
        let lab = setup().await;
        let created = create_demo_escrow(&lab).await;

        let mismatched = lab.escrow.generate_tx_id(
            lab.seller.address(),
            lab.buyer.address(),
            lab.faucet.address(),
            keccak256(b"other"),
        );
        let result = lab.escrow.pay_escrow(&lab.buyer, mismatched, price()).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("unknown transaction id")
        );

        // The record under the real id is untouched.
        let record = lab.escrow.escrow_of(created).await.unwrap().unwrap();
        assert_eq!(record.status, EscrowStatus::Pending);
    }
}

// ---------------------------------------------------------------------------
// Terms builder validation
// ---------------------------------------------------------------------------

mod terms_validation {
    use super::*;

    #[test]
    fn missing_tx_id_fails() {
        let result = TermsBuilder::new()
            .price(price())
            .token(Signer::random().address())
            .buyer(Signer::random().address())
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("transaction id"));
    }

    #[test]
    fn missing_token_fails() {
        let result = TermsBuilder::new()
            .tx_id(keccak256(b"id"))
            .price(price())
            .buyer(Signer::random().address())
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("token contract"));
    }

    #[test]
    fn missing_buyer_fails() {
        let result = TermsBuilder::new()
            .tx_id(keccak256(b"id"))
            .price(price())
            .token(Signer::random().address())
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("buyer"));
    }

    #[test]
    fn missing_price_fails() {
        let result = TermsBuilder::new()
            .tx_id(keccak256(b"id"))
            .token(Signer::random().address())
            .buyer(Signer::random().address())
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("price required"));
    }

    #[test]
    fn zero_price_fails() {
        let result = TermsBuilder::new()
            .tx_id(keccak256(b"id"))
            .price(U256::ZERO)
            .token(Signer::random().address())
            .buyer(Signer::random().address())
            .build();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("price must be > 0"));
    }

    #[test]
    fn token_unit_defaults_to_zero() {
        let terms = TermsBuilder::new()
            .tx_id(keccak256(b"id"))
            .price(price())
            .token(Signer::random().address())
            .buyer(Signer::random().address())
            .build()
            .unwrap();
        assert_eq!(terms.token_unit, 0);
    }
}
