mod common;

use common::{key, system_account, token_account, MockRpc};
use sol_sdk::sol_core::derive_associated_token_address;
use sol_sdk::{find_spl_token_destination_address, SolError};

#[tokio::test]
async fn token_account_for_the_mint_is_used_as_is() {
    let mint = key(1);
    let destination = key(2);
    let rpc = MockRpc::default().with_account(destination, token_account(mint, key(3), 0));

    let resolved = find_spl_token_destination_address(&rpc, &mint, &destination)
        .await
        .unwrap();

    assert_eq!(resolved.destination, destination);
    assert!(!resolved.is_unregistered_associated_token);
    assert_eq!(rpc.lookups(), vec![destination]);
}

#[tokio::test]
async fn wallet_with_registered_associated_account() {
    let mint = key(1);
    let wallet = key(2);
    let associated = derive_associated_token_address(&wallet, &mint).unwrap();
    let rpc = MockRpc::default()
        .with_account(wallet, system_account(1_000_000))
        .with_account(associated, token_account(mint, wallet, 10));

    let resolved = find_spl_token_destination_address(&rpc, &mint, &wallet)
        .await
        .unwrap();

    assert_eq!(resolved.destination, associated);
    assert!(!resolved.is_unregistered_associated_token);
}

#[tokio::test]
async fn wallet_without_associated_account() {
    let mint = key(1);
    let wallet = key(2);
    let rpc = MockRpc::default().with_account(wallet, system_account(1_000_000));

    let resolved = find_spl_token_destination_address(&rpc, &mint, &wallet)
        .await
        .unwrap();

    assert_eq!(
        resolved.destination,
        derive_associated_token_address(&wallet, &mint).unwrap()
    );
    assert!(resolved.is_unregistered_associated_token);
    assert_eq!(rpc.lookups().len(), 2);
}

#[tokio::test]
async fn unknown_address_is_a_fresh_wallet_without_second_lookup() {
    let mint = key(1);
    let wallet = key(2);
    let rpc = MockRpc::default();

    let resolved = find_spl_token_destination_address(&rpc, &mint, &wallet)
        .await
        .unwrap();

    assert_eq!(
        resolved.destination,
        derive_associated_token_address(&wallet, &mint).unwrap()
    );
    assert!(resolved.is_unregistered_associated_token);
    assert_eq!(rpc.lookups(), vec![wallet]);
}

#[tokio::test]
async fn token_account_of_another_mint_is_rejected() {
    let destination = key(2);
    let rpc = MockRpc::default().with_account(destination, token_account(key(4), key(3), 0));

    let err = find_spl_token_destination_address(&rpc, &key(1), &destination)
        .await
        .unwrap_err();
    assert!(matches!(err, SolError::InvalidDestination));
}

#[tokio::test]
async fn node_failures_propagate() {
    let mint = key(1);
    let wallet = key(2);
    let rpc = MockRpc {
        failing: vec![wallet],
        ..MockRpc::default()
    };
    let err = find_spl_token_destination_address(&rpc, &mint, &wallet)
        .await
        .unwrap_err();
    assert!(matches!(err, SolError::InvalidResponse { code: 503, .. }));

    let associated = derive_associated_token_address(&wallet, &mint).unwrap();
    let rpc = MockRpc {
        failing: vec![associated],
        ..MockRpc::default()
    }
    .with_account(wallet, system_account(1));
    let err = find_spl_token_destination_address(&rpc, &mint, &wallet)
        .await
        .unwrap_err();
    assert!(matches!(err, SolError::InvalidResponse { code: 503, .. }));
}
