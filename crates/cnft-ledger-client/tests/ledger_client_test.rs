//! Contract tests for the ledger client against a wiremock JSON-RPC endpoint.
//!
//! ## Methods Tested
//!
//! | Method | Test |
//! |--------|------|
//! | `getAccountInfo` | `tree_state_*` |
//! | `getLatestBlockhash` | `latest_blockhash_*` |
//! | `sendTransaction` | `send_*` |
//! | `getSignatureStatuses` | `confirm_*` |

use base64::Engine;
use cnft_core::{
    AccountMeta, Hash, Hash32, Instruction, LedgerError, LedgerReader, LedgerSubmitter, Message,
    Pubkey, SignedTransaction, Transaction, TransactionSigner,
};
use cnft_ledger_client::{Keypair, LedgerClient, LedgerConfig};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TREE: Pubkey = Pubkey::new_from_array([7; 32]);

fn test_client(mock_server: &MockServer) -> LedgerClient {
    LedgerClient::new(LedgerConfig::local_mock(&mock_server.uri()).unwrap()).unwrap()
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": "cnft-ledger", "result": result }))
}

/// Tree account bytes: depth 3, buffer 2, no canopy, active log 1.
fn tree_account(root: [u8; 32], next_leaf: u32) -> Vec<u8> {
    let depth = 3usize;
    let mut out = vec![1u8, 0u8];
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&3u32.to_le_bytes());
    out.extend_from_slice(&[0xAB; 32]);
    out.extend_from_slice(&9u64.to_le_bytes());
    out.extend_from_slice(&[0; 6]);
    out.extend_from_slice(&5u64.to_le_bytes());
    out.extend_from_slice(&1u64.to_le_bytes());
    out.extend_from_slice(&2u64.to_le_bytes());
    for i in 0..2u32 {
        out.extend_from_slice(if i == 1 { &root } else { &[0; 32] });
        out.extend(std::iter::repeat(0u8).take(32 * depth));
        out.extend_from_slice(&i.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
    }
    out.extend(std::iter::repeat(0u8).take(32 * depth + 32));
    out.extend_from_slice(&next_leaf.to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out
}

fn signed_transaction(kp: &Keypair) -> SignedTransaction {
    let ix = Instruction::new_with_bytes(
        Pubkey::new_from_array([3; 32]),
        &[1, 2, 3],
        vec![
            AccountMeta::new(kp.address(), true),
            AccountMeta::new_readonly(Pubkey::new_from_array([4; 32]), false),
        ],
    );
    let message = Message::new_with_blockhash(
        &[ix],
        Some(&kp.address()),
        &Hash::new_from_array([9; 32]),
    );
    let sig = kp.sign(&message.serialize()).unwrap();
    SignedTransaction::new(Transaction {
        signatures: vec![sig],
        message,
    })
    .unwrap()
}

// ── getAccountInfo ───────────────────────────────────────────────────

#[tokio::test]
async fn tree_state_decodes_account_data() {
    let mock_server = MockServer::start().await;
    let data = base64::engine::general_purpose::STANDARD.encode(tree_account([0x5C; 32], 6));

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "getAccountInfo",
            "params": [TREE.to_string(), { "encoding": "base64", "commitment": "confirmed" }]
        })))
        .respond_with(rpc_result(json!({
            "context": { "slot": 100 },
            "value": {
                "data": [data, "base64"],
                "owner": "cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK",
                "lamports": 1_000_000,
                "executable": false,
                "rentEpoch": 0
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tree = test_client(&mock_server).tree_state(&TREE).await.unwrap();
    assert_eq!(tree.address, TREE);
    assert_eq!(tree.root, Hash32([0x5C; 32]));
    assert_eq!(tree.max_depth, 3);
    assert_eq!(tree.max_buffer_size, 2);
    assert_eq!(tree.canopy_depth, 0);
    assert_eq!(tree.sequence_number, 5);
    assert_eq!(tree.next_leaf_index, 6);
    assert_eq!(tree.authority, Pubkey::new_from_array([0xAB; 32]));
}

#[tokio::test]
async fn tree_state_missing_account_is_account_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({ "context": { "slot": 1 }, "value": null })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).tree_state(&TREE).await.unwrap_err();
    assert!(matches!(err, LedgerError::AccountNotFound { address } if address == TREE));
}

#[tokio::test]
async fn tree_state_non_tree_account_is_invalid() {
    let mock_server = MockServer::start().await;
    let data = base64::engine::general_purpose::STANDARD.encode([0u8; 80]);
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({
            "context": { "slot": 1 },
            "value": { "data": [data, "base64"], "owner": "11111111111111111111111111111111" }
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).tree_state(&TREE).await.unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTreeAccount { .. }));
}

#[tokio::test]
async fn tree_state_server_error_is_unavailable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).tree_state(&TREE).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unavailable { .. }));
}

// ── getLatestBlockhash ───────────────────────────────────────────────

#[tokio::test]
async fn latest_blockhash_decodes_hash() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getLatestBlockhash" })))
        .respond_with(rpc_result(json!({
            "context": { "slot": 1 },
            "value": { "blockhash": Hash::new_from_array([4; 32]).to_string(), "lastValidBlockHeight": 3090 }
        })))
        .mount(&mock_server)
        .await;

    let hash = test_client(&mock_server).latest_blockhash().await.unwrap();
    assert_eq!(hash, Hash::new_from_array([4; 32]));
}

#[tokio::test]
async fn latest_blockhash_rejects_padded_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({
            "context": { "slot": 1 },
            "value": { "blockhash": format!(" {}", Hash::new_from_array([4; 32])) }
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).latest_blockhash().await.unwrap_err();
    assert!(matches!(err, LedgerError::Codec(_)));
}

#[tokio::test]
async fn send_wire_bytes_decode_back_to_the_signed_transaction() {
    let tx = signed_transaction(&Keypair::generate());
    let raw = base64::engine::general_purpose::STANDARD
        .decode(tx.to_base64())
        .unwrap();
    let decoded: Transaction = bincode::deserialize(&raw).unwrap();
    assert_eq!(&decoded, tx.transaction());
    decoded.verify().unwrap();
}

// ── sendTransaction ──────────────────────────────────────────────────

#[tokio::test]
async fn send_posts_base64_wire_bytes_and_returns_signature() {
    let mock_server = MockServer::start().await;
    let kp = Keypair::generate();
    let tx = signed_transaction(&kp);

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "sendTransaction",
            "params": [tx.to_base64(), { "encoding": "base64", "preflightCommitment": "confirmed" }]
        })))
        .respond_with(rpc_result(json!(tx.signature().to_string())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sig = test_client(&mock_server).send(&tx).await.unwrap();
    assert_eq!(sig, tx.signature());
}

#[tokio::test]
async fn send_preflight_failure_is_rpc_error() {
    let mock_server = MockServer::start().await;
    let tx = signed_transaction(&Keypair::generate());
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "cnft-ledger",
            "error": { "code": -32002, "message": "Transaction simulation failed: Blockhash not found" }
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).send(&tx).await.unwrap_err();
    match err {
        LedgerError::Rpc { endpoint, code, message } => {
            assert_eq!(endpoint, "sendTransaction");
            assert_eq!(code, -32002);
            assert!(message.contains("Blockhash not found"));
        }
        other => panic!("expected Rpc, got {other:?}"),
    }
}

// ── getSignatureStatuses ─────────────────────────────────────────────

#[tokio::test]
async fn confirm_succeeds_once_commitment_reached() {
    let mock_server = MockServer::start().await;
    let tx = signed_transaction(&Keypair::generate());

    // First poll: unknown. Afterwards: confirmed.
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getSignatureStatuses" })))
        .respond_with(rpc_result(json!({ "context": { "slot": 1 }, "value": [null] })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getSignatureStatuses" })))
        .respond_with(rpc_result(json!({
            "context": { "slot": 2 },
            "value": [{ "slot": 2, "confirmations": 1, "err": null, "confirmationStatus": "confirmed" }]
        })))
        .mount(&mock_server)
        .await;

    test_client(&mock_server).confirm(&tx.signature()).await.unwrap();
}

#[tokio::test]
async fn confirm_processed_only_times_out() {
    let mock_server = MockServer::start().await;
    let tx = signed_transaction(&Keypair::generate());
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({
            "context": { "slot": 2 },
            "value": [{ "slot": 2, "confirmations": 0, "err": null, "confirmationStatus": "processed" }]
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).confirm(&tx.signature()).await.unwrap_err();
    assert!(matches!(err, LedgerError::ConfirmationTimeout { signature, .. } if signature == tx.signature()));
}

#[tokio::test]
async fn confirm_landed_with_error_is_transaction_failed() {
    let mock_server = MockServer::start().await;
    let tx = signed_transaction(&Keypair::generate());
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({
            "context": { "slot": 2 },
            "value": [{
                "slot": 2,
                "confirmations": 1,
                "err": { "InstructionError": [0, { "Custom": 6001 }] },
                "confirmationStatus": "confirmed"
            }]
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).confirm(&tx.signature()).await.unwrap_err();
    match err {
        LedgerError::TransactionFailed { reason, .. } => assert!(reason.contains("6001")),
        other => panic!("expected TransactionFailed, got {other:?}"),
    }
}
