//! Contract tests for the index client against a wiremock JSON-RPC endpoint.
//!
//! ## Methods Tested
//!
//! | Method | Test |
//! |--------|------|
//! | `getAsset` | `resolve_*`, `get_asset_*` |
//! | `getAssetProof` | `fetch_proof_*` |

use std::time::{Duration, Instant};

use cnft_core::{leaf_asset_id, AssetIndex, CodecError, Hash32, Pubkey};
use cnft_index_client::{IndexClient, IndexConfig, IndexError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TREE: Pubkey = Pubkey::new_from_array([7; 32]);

fn test_client(mock_server: &MockServer) -> IndexClient {
    IndexClient::new(IndexConfig::local_mock(&mock_server.uri()).unwrap()).unwrap()
}

fn asset_json(id: Pubkey, tree: Pubkey, leaf: u64, owner: Pubkey) -> serde_json::Value {
    json!({
        "interface": "V1_NFT",
        "id": id.to_string(),
        "content": { "json_uri": "https://arweave.net/meta.json", "metadata": { "name": "Parcel" } },
        "compression": {
            "eligible": false,
            "compressed": true,
            "data_hash": Hash32([1; 32]).to_string(),
            "creator_hash": Hash32([2; 32]).to_string(),
            "asset_hash": Hash32([3; 32]).to_string(),
            "tree": tree.to_string(),
            "seq": 12,
            "leaf_id": leaf
        },
        "grouping": [{ "group_key": "collection", "group_value": Pubkey::new_from_array([5; 32]).to_string() }],
        "ownership": {
            "frozen": false,
            "delegated": false,
            "delegate": null,
            "ownership_model": "single",
            "owner": owner.to_string()
        },
        "burnt": false
    })
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": "cnft-index", "result": result }))
}

// ── getAsset ─────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_derives_id_and_decodes_record() {
    let mock_server = MockServer::start().await;
    let id = leaf_asset_id(&TREE, 5).unwrap();
    let owner = Pubkey::new_from_array([3; 32]);

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({
            "jsonrpc": "2.0",
            "method": "getAsset",
            "params": { "id": id.to_string() }
        })))
        .respond_with(rpc_result(asset_json(id, TREE, 5, owner)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let asset = client.assets().resolve(&TREE, 5).await.unwrap();
    assert_eq!(asset.id, id);
    assert_eq!(asset.tree, TREE);
    assert_eq!(asset.leaf_index, 5);
    assert_eq!(asset.owner, owner);
    assert_eq!(asset.delegate, None);
    assert_eq!(asset.data_hash, Hash32([1; 32]));
    assert_eq!(asset.collection, Some(Pubkey::new_from_array([5; 32])));
}

#[tokio::test]
async fn resolve_null_result_is_asset_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(serde_json::Value::Null))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).resolve(&TREE, 0).await.unwrap_err();
    let expected = leaf_asset_id(&TREE, 0).unwrap();
    assert!(matches!(err, IndexError::AssetNotFound { asset_id } if asset_id == expected));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn resolve_not_found_error_object_is_asset_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "cnft-index",
            "error": { "code": -32000, "message": "Asset Not Found" }
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).resolve(&TREE, 1).await.unwrap_err();
    assert!(matches!(err, IndexError::AssetNotFound { .. }));
}

#[tokio::test]
async fn resolve_other_error_object_is_rpc_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "cnft-index",
            "error": { "code": -32602, "message": "invalid params" }
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).resolve(&TREE, 1).await.unwrap_err();
    match err {
        IndexError::Rpc { endpoint, code, .. } => {
            assert_eq!(endpoint, "getAsset");
            assert_eq!(code, -32602);
        }
        other => panic!("expected Rpc, got {other:?}"),
    }
}

#[tokio::test]
async fn resolve_method_not_found_is_rpc_error_not_missing_asset() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "cnft-index",
            "error": { "code": -32601, "message": "Method not found" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).resolve(&TREE, 1).await.unwrap_err();
    match err {
        IndexError::Rpc { endpoint, code, message } => {
            assert_eq!(endpoint, "getAsset");
            assert_eq!(code, -32601);
            assert_eq!(message, "Method not found");
        }
        other => panic!("expected Rpc, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_proof_record_not_found_is_asset_not_found() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": "cnft-index",
            "error": {
                "code": -32000,
                "message": "Database Error: RecordNotFound Error: Asset Proof Not Found"
            }
        })))
        .mount(&mock_server)
        .await;

    let id = Pubkey::new_from_array([9; 32]);
    let err = test_client(&mock_server).fetch_proof(&id).await.unwrap_err();
    assert!(matches!(err, IndexError::AssetNotFound { asset_id } if asset_id == id));
}

#[tokio::test]
async fn resolve_server_error_is_unavailable_and_not_retried_by_transport() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).resolve(&TREE, 2).await.unwrap_err();
    assert!(matches!(err, IndexError::Unavailable { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn resolve_rejects_record_for_other_leaf() {
    let mock_server = MockServer::start().await;
    let id = leaf_asset_id(&TREE, 3).unwrap();
    Mock::given(method("POST"))
        .respond_with(rpc_result(asset_json(id, TREE, 4, Pubkey::new_from_array([3; 32]))))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).resolve(&TREE, 3).await.unwrap_err();
    assert!(matches!(err, IndexError::Deserialization { .. }));
}

#[tokio::test]
async fn get_asset_burnt_is_asset_not_found() {
    let mock_server = MockServer::start().await;
    let id = Pubkey::new_from_array([9; 32]);
    let mut body = asset_json(id, TREE, 0, Pubkey::new_from_array([3; 32]));
    body["burnt"] = json!(true);
    Mock::given(method("POST"))
        .respond_with(rpc_result(body))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).assets().get(&id).await.unwrap_err();
    assert!(matches!(err, IndexError::AssetNotFound { .. }));
}

#[tokio::test]
async fn get_asset_sends_api_key_as_query_parameter() {
    let mock_server = MockServer::start().await;
    let id = Pubkey::new_from_array([9; 32]);
    Mock::given(method("POST"))
        .and(query_param("api-key", "index-key"))
        .respond_with(rpc_result(asset_json(id, TREE, 0, Pubkey::new_from_array([3; 32]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = IndexConfig::local_mock(&mock_server.uri()).unwrap();
    config.api_key = Some(zeroize::Zeroizing::new("index-key".into()));
    let client = IndexClient::new(config).unwrap();
    assert_eq!(client.assets().get(&id).await.unwrap().id, id);
}

// ── getAssetProof ────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_proof_decodes_path_in_order() {
    let mock_server = MockServer::start().await;
    let id = Pubkey::new_from_array([9; 32]);
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "getAssetProof",
            "params": { "id": id.to_string() }
        })))
        .respond_with(rpc_result(json!({
            "root": Hash32([8; 32]).to_string(),
            "proof": [Hash32([10; 32]).to_string(), Hash32([11; 32]).to_string()],
            "node_index": 6,
            "leaf": Hash32([6; 32]).to_string(),
            "tree_id": TREE.to_string()
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let proof = test_client(&mock_server).fetch_proof(&id).await.unwrap();
    assert_eq!(proof.asset_id, id);
    assert_eq!(proof.tree, TREE);
    assert_eq!(proof.root, Hash32([8; 32]));
    assert_eq!(proof.proof, vec![Hash32([10; 32]), Hash32([11; 32])]);
    assert_eq!(proof.node_index, 6);
}

#[tokio::test]
async fn fetch_proof_is_never_cached() {
    let mock_server = MockServer::start().await;
    let id = Pubkey::new_from_array([9; 32]);
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({
            "root": Hash32([8; 32]).to_string(),
            "proof": [Hash32([10; 32]).to_string()],
            "node_index": 2,
            "leaf": Hash32([6; 32]).to_string(),
            "tree_id": TREE.to_string()
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    client.fetch_proof(&id).await.unwrap();
    client.fetch_proof(&id).await.unwrap();
}

#[tokio::test]
async fn fetch_proof_empty_path_is_empty_proof() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rpc_result(json!({
            "root": Hash32([8; 32]).to_string(),
            "proof": [],
            "node_index": 1,
            "leaf": Hash32([6; 32]).to_string(),
            "tree_id": TREE.to_string()
        })))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .fetch_proof(&Pubkey::new_from_array([9; 32]))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Codec(CodecError::EmptyProof)));
}

#[tokio::test]
async fn fetch_proof_malformed_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .fetch_proof(&Pubkey::new_from_array([9; 32]))
        .await
        .unwrap_err();
    assert!(matches!(err, IndexError::Deserialization { .. }));
}

#[tokio::test]
async fn fetch_proof_unreachable_index_fails_fast() {
    let client = IndexClient::new(IndexConfig::local_mock("http://127.0.0.1:1").unwrap()).unwrap();

    let started = Instant::now();
    let err = client
        .fetch_proof(&Pubkey::new_from_array([9; 32]))
        .await
        .unwrap_err();

    assert!(matches!(err, IndexError::Unavailable { ref endpoint, .. } if endpoint == "getAssetProof"));
    assert!(err.is_retryable());
    assert!(
        started.elapsed() < Duration::from_millis(1000),
        "unreachable index took {:?} to surface",
        started.elapsed()
    );
}
