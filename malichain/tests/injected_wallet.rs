//! Injected-provider adapter against an in-memory host.

#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use std::sync::Arc;

use alloy::primitives::U256;
use common::{ALICE, BOB, MockHost, TX_HASH, checksummed, init_tracing, test_config};
use malichain::config::GasLimit;
use malichain::prelude::*;
use serde_json::{Value, json};

fn wallet(host: &Arc<MockHost>) -> InjectedWallet {
    let shared: SharedHostProvider = Arc::<MockHost>::clone(host);
    InjectedWallet::new(Some(shared), test_config())
}

fn sent_tx(host: &MockHost) -> Value {
    let calls = host.calls_to("eth_sendTransaction");
    assert_eq!(calls.len(), 1, "expected exactly one submission");
    calls[0][0].clone()
}

fn address(value: &Value) -> String {
    value.as_str().unwrap().to_lowercase()
}

fn quantity(value: &Value) -> U256 {
    let s = value.as_str().unwrap();
    U256::from_str_radix(s.trim_start_matches("0x"), 16).unwrap()
}

#[tokio::test]
async fn test_connect_adopts_first_account() {
    init_tracing();
    let host = MockHost::with_accounts(&[ALICE, BOB]);
    let account = wallet(&host).connect().await.unwrap();

    assert_eq!(account, Some(checksummed(ALICE)));
    assert_eq!(
        host.methods(),
        vec!["wallet_switchEthereumChain", "eth_requestAccounts"]
    );
    assert_eq!(
        host.calls_to("wallet_switchEthereumChain")[0],
        json!([{ "chainId": "0x128" }])
    );
}

#[tokio::test]
async fn test_connect_with_zero_accounts() {
    let host = MockHost::with_accounts(&[]);
    assert_eq!(wallet(&host).connect().await.unwrap(), None);
}

#[tokio::test]
async fn test_connect_registers_unknown_network_and_retries() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push_error("wallet_switchEthereumChain", 4902, "Unrecognized chain ID");

    let account = wallet(&host).connect().await.unwrap();

    assert_eq!(account, Some(checksummed(ALICE)));
    assert_eq!(
        host.methods(),
        vec![
            "wallet_switchEthereumChain",
            "wallet_addEthereumChain",
            "wallet_switchEthereumChain",
            "eth_requestAccounts",
        ]
    );
    let add = &host.calls_to("wallet_addEthereumChain")[0][0];
    assert_eq!(add["chainId"], "0x128");
    assert_eq!(add["nativeCurrency"]["decimals"], 18);
    assert_eq!(add["rpcUrls"], json!(["https://testnet.hashio.io/api"]));
}

#[tokio::test]
async fn test_connect_aborts_when_retry_fails() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push_error("wallet_switchEthereumChain", 4902, "Unrecognized chain ID");
    host.push_error("wallet_switchEthereumChain", 4902, "Unrecognized chain ID");

    assert_eq!(wallet(&host).connect().await.unwrap(), None);
    assert!(!host.methods().contains(&"eth_requestAccounts".to_owned()));
    // Retried once, not more.
    assert_eq!(host.calls_to("wallet_switchEthereumChain").len(), 2);
}

#[tokio::test]
async fn test_connect_aborts_on_other_switch_error() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push_error("wallet_switchEthereumChain", -32603, "internal error");

    assert_eq!(wallet(&host).connect().await.unwrap(), None);
    assert!(host.calls_to("wallet_addEthereumChain").is_empty());
}

#[tokio::test]
async fn test_connect_user_rejection_is_benign() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push_error("eth_requestAccounts", 4001, "User rejected the request.");

    assert_eq!(wallet(&host).connect().await.unwrap(), None);
}

#[tokio::test]
async fn test_native_transfer_converts_exactly_and_confirms() -> anyhow::Result<()> {
    init_tracing();
    let host = MockHost::with_accounts(&[ALICE]);
    host.push("eth_sendTransaction", Ok(json!(TX_HASH)));
    host.push("eth_getTransactionReceipt", Ok(Value::Null));
    host.push(
        "eth_getTransactionReceipt",
        Ok(json!({ "transactionHash": TX_HASH, "status": "0x1" })),
    );

    let to: AccountId = "0.0.1234".parse()?;
    let outcome = wallet(&host).transfer_native_currency(&to, "0.0001").await;

    assert_eq!(outcome, TransactionOutcome::Submitted(TX_HASH.to_owned()));
    let tx = sent_tx(&host);
    assert_eq!(address(&tx["to"]), "0x00000000000000000000000000000000000004d2");
    assert_eq!(quantity(&tx["value"]), U256::from(100_000_000_000_000_u64));
    // Native transfers leave gas to the host by default.
    assert!(tx.get("gas").is_none());
    assert_eq!(host.calls_to("eth_getTransactionReceipt").len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_native_transfer_reverted_is_no_outcome() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push("eth_sendTransaction", Ok(json!(TX_HASH)));
    host.push("eth_getTransactionReceipt", Ok(json!({ "status": "0x0" })));

    let outcome = wallet(&host)
        .transfer_native_currency(&AccountId::from_num(2), "1")
        .await;
    assert_eq!(outcome, TransactionOutcome::NotSubmitted);
}

#[tokio::test]
async fn test_native_transfer_rejects_invalid_amount() {
    let host = MockHost::with_accounts(&[ALICE]);
    let outcome = wallet(&host)
        .transfer_native_currency(&AccountId::from_num(2), "-1")
        .await;
    assert_eq!(outcome, TransactionOutcome::NotSubmitted);
    assert!(host.calls_to("eth_sendTransaction").is_empty());
}

#[tokio::test]
async fn test_transfer_user_cancellation_is_no_outcome() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push_error("eth_sendTransaction", 4001, "User denied transaction signature.");

    let outcome = wallet(&host)
        .transfer_native_currency(&AccountId::from_num(2), "1")
        .await;
    assert_eq!(outcome, TransactionOutcome::NotSubmitted);
    assert!(host.calls_to("eth_getTransactionReceipt").is_empty());
}

#[tokio::test]
async fn test_transfer_without_accounts_is_no_outcome() {
    let host = MockHost::with_accounts(&[]);
    let outcome = wallet(&host)
        .transfer_native_currency(&AccountId::from_num(2), "1")
        .await;
    assert_eq!(outcome, TransactionOutcome::NotSubmitted);
    assert!(host.calls_to("eth_sendTransaction").is_empty());
}

#[tokio::test]
async fn test_fungible_transfer_calls_token_contract() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push("eth_sendTransaction", Ok(json!(TX_HASH)));

    let token: TokenId = "0.0.5005".parse().unwrap();
    let outcome = wallet(&host)
        .transfer_fungible_token(&AccountId::from_num(1234), &token, 250)
        .await;

    assert_eq!(outcome.hash(), Some(TX_HASH));
    let tx = sent_tx(&host);
    assert_eq!(address(&tx["to"]), "0x000000000000000000000000000000000000138d");
    assert_eq!(address(&tx["from"]), ALICE);
    let data = tx["input"].as_str().unwrap();
    // transfer(address,uint256)
    assert!(data.starts_with("0xa9059cbb"));
    assert!(data.ends_with(&format!("{:064x}", 250)));
    assert_eq!(quantity(&tx["gas"]), U256::from(50_000_u64));
}

#[tokio::test]
async fn test_non_fungible_transfer_uses_signer_as_from() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push("eth_sendTransaction", Ok(json!(TX_HASH)));

    let token = TokenId::from_num(6006);
    let outcome = wallet(&host)
        .transfer_non_fungible_token(&AccountId::from_num(77), &token, 3)
        .await;

    assert!(outcome.is_submitted());
    let data = sent_tx(&host)["input"].as_str().unwrap().to_owned();
    // transferFrom(address,address,uint256)
    assert!(data.starts_with("0x23b872dd"));
    let from_word = &data[10..74];
    assert!(from_word.ends_with(ALICE.trim_start_matches("0x")));
    assert_eq!(quantity(&sent_tx(&host)["gas"]), U256::from(100_000_u64));
    // The signer is resolved once and reused as the sender.
    assert_eq!(host.calls_to("eth_requestAccounts").len(), 1);
    assert_eq!(address(&sent_tx(&host)["from"]), ALICE);
}

#[tokio::test]
async fn test_associate_is_zero_argument_call() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push("eth_sendTransaction", Ok(json!(TX_HASH)));

    let outcome = wallet(&host).associate_token(&TokenId::from_num(5005)).await;

    assert!(outcome.is_submitted());
    let tx = sent_tx(&host);
    // associate()
    assert_eq!(tx["input"], "0x0a754de6");
    assert_eq!(quantity(&tx["gas"]), U256::from(800_000_u64));
}

#[tokio::test]
async fn test_estimate_gas_limit_sends_no_gas_field() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push("eth_sendTransaction", Ok(json!(TX_HASH)));

    let params = ContractFunctionParameterBuilder::new();
    let outcome = wallet(&host)
        .execute_contract_function(
            TokenId::from_num(5005).to_contract_address(),
            "associate",
            &params,
            GasLimit::Estimate,
        )
        .await;

    assert!(outcome.is_submitted());
    assert!(sent_tx(&host).get("gas").is_none());
}

#[tokio::test]
async fn test_contract_failure_is_no_outcome() {
    let host = MockHost::with_accounts(&[ALICE]);
    host.push_error("eth_sendTransaction", -32000, "execution reverted");

    let outcome = wallet(&host).associate_token(&TokenId::from_num(5005)).await;
    assert_eq!(outcome, TransactionOutcome::NotSubmitted);
}

#[tokio::test]
async fn test_disconnect_requires_manual_action() {
    let host = MockHost::with_accounts(&[ALICE]);
    let notice = wallet(&host).disconnect().await;
    assert!(matches!(notice, DisconnectNotice::ManualActionRequired(_)));
    assert!(host.calls().is_empty());
}

#[tokio::test]
async fn test_account_subscription_lifecycle() {
    let host = MockHost::with_accounts(&[ALICE]);
    let state = ConnectionState::new();
    let subscription = wallet(&host).observe_account_changes(state.clone()).unwrap();
    assert_eq!(host.listener_count("accountsChanged"), 1);

    host.emit("accountsChanged", &json!([BOB, ALICE]));
    assert_eq!(state.account(), checksummed(BOB));
    assert_eq!(state.active(), Some(AdapterKind::Injected));

    host.emit("accountsChanged", &json!([]));
    assert_eq!(state.account(), "");
    assert_eq!(state.active(), None);

    subscription.release();
    assert_eq!(host.listener_count("accountsChanged"), 0);

    // No longer observed.
    host.emit("accountsChanged", &json!([ALICE]));
    assert_eq!(state.account(), "");
}

#[tokio::test]
async fn test_account_subscription_released_on_drop() {
    let host = MockHost::with_accounts(&[ALICE]);
    {
        let _subscription = wallet(&host)
            .observe_account_changes(ConnectionState::new())
            .unwrap();
        assert_eq!(host.listener_count("accountsChanged"), 1);
    }
    assert_eq!(host.listener_count("accountsChanged"), 0);
}

#[tokio::test]
async fn test_malformed_accounts_event_is_ignored() {
    let host = MockHost::with_accounts(&[ALICE]);
    let state = ConnectionState::new();
    state.set_connected(AdapterKind::Injected, checksummed(ALICE));
    let _subscription = wallet(&host).observe_account_changes(state.clone()).unwrap();

    host.emit("accountsChanged", &json!({ "unexpected": true }));
    assert_eq!(state.account(), checksummed(ALICE));
}

#[tokio::test]
async fn test_sync_accounts_reads_silently() {
    let host = MockHost::with_accounts(&[ALICE]);
    let state = ConnectionState::new();
    let first = wallet(&host).sync_accounts(&state).await.unwrap();

    assert_eq!(first, Some(checksummed(ALICE)));
    assert_eq!(state.account(), checksummed(ALICE));
    assert_eq!(host.methods(), vec!["eth_accounts"]);
}
