//! End-to-end gate runs against a mock JSON-RPC node.

use serde_json::json;
use trustgate_core::{GateVerdict, run_gate};
use trustgate_types::MissingSetting;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{
    AGENT, OTHER_REGISTRY, REGISTRY, config, forbid_requests, mount_trust_answer, start_node,
    write_descriptor, write_descriptor_for,
};

#[tokio::test]
async fn registered_agent_is_trusted() {
    let node = start_node().await;
    mount_trust_answer(&node, true, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(Some(&node.uri()), Some(AGENT), &descriptor)).await;

    assert_eq!(verdict.to_string(), "TRUSTED");
    assert!(verdict.permits_delegation());
}

#[tokio::test]
async fn unregistered_agent_is_untrusted() {
    let node = start_node().await;
    mount_trust_answer(&node, false, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(Some(&node.uri()), Some(AGENT), &descriptor)).await;

    assert_eq!(verdict.to_string(), "UNTRUSTED");
    assert!(!verdict.permits_delegation());
}

#[tokio::test]
async fn call_is_sent_to_descriptor_address() {
    let node = start_node().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "method": "eth_call",
            "params": [{ "to": REGISTRY }, "latest"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": format!("0x{:064x}", 1)
        })))
        .expect(1)
        .mount(&node)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(Some(&node.uri()), Some(AGENT), &descriptor)).await;
    assert_eq!(verdict, GateVerdict::Trusted);
}

#[tokio::test]
async fn redeployed_registry_is_picked_up_without_restart() {
    let node = start_node().await;
    for (address, answer) in [(REGISTRY, true), (OTHER_REGISTRY, false)] {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "params": [{ "to": address }] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": format!("0x{:064x}", u8::from(answer))
            })))
            .expect(1)
            .mount(&node)
            .await;
    }
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());
    let config = config(Some(&node.uri()), Some(AGENT), &descriptor);

    assert_eq!(run_gate(&config).await, GateVerdict::Trusted);
    write_descriptor_for(dir.path(), OTHER_REGISTRY);
    assert_eq!(run_gate(&config).await, GateVerdict::Untrusted);
}

#[tokio::test]
async fn reverted_call_is_error() {
    let node = start_node().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": 3, "message": "execution reverted" }
        })))
        .mount(&node)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(Some(&node.uri()), Some(AGENT), &descriptor)).await;

    let text = verdict.to_string();
    assert!(text.starts_with("ERROR: "), "{text}");
    assert!(text.contains("execution reverted"), "{text}");
    assert!(!verdict.permits_delegation());
}

#[tokio::test]
async fn unreachable_node_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(Some("http://127.0.0.1:1"), Some(AGENT), &descriptor)).await;

    assert_eq!(verdict.kind(), "error");
    assert!(verdict.to_string().starts_with("ERROR: "));
}

#[tokio::test]
async fn missing_descriptor_is_error_without_network() {
    let node = start_node().await;
    forbid_requests(&node).await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = dir.path().join("contract_info.json");

    let verdict = run_gate(&config(Some(&node.uri()), Some(AGENT), &descriptor)).await;

    assert_eq!(verdict.kind(), "error");
    assert!(verdict.to_string().contains("not found"));
}

#[tokio::test]
async fn missing_target_is_not_configured_without_network() {
    let node = start_node().await;
    forbid_requests(&node).await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(Some(&node.uri()), None, &descriptor)).await;

    assert_eq!(verdict, GateVerdict::NotConfigured(MissingSetting::TargetAddress));
    assert!(verdict.to_string().contains("cannot verify the remote agent"));
}

#[tokio::test]
async fn missing_rpc_url_is_not_configured() {
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(None, Some(AGENT), &descriptor)).await;

    assert_eq!(verdict, GateVerdict::NotConfigured(MissingSetting::RpcUrl));
}

#[tokio::test]
async fn malformed_target_is_error_without_network() {
    let node = start_node().await;
    forbid_requests(&node).await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = write_descriptor(dir.path());

    let verdict = run_gate(&config(Some(&node.uri()), Some("0x1234"), &descriptor)).await;

    assert_eq!(verdict.kind(), "error");
}

#[tokio::test]
async fn legacy_registry_artifact_is_usable() {
    let node = start_node().await;
    mount_trust_answer(&node, true, 1).await;
    let dir = tempfile::tempdir().unwrap();
    let descriptor = dir.path().join("contract_info.json");
    let body = json!({
        "address": REGISTRY,
        "abi": [{
            "constant": true,
            "name": "isTrusted",
            "inputs": [{ "name": "agent", "type": "address" }],
            "outputs": [{ "name": "", "type": "bool" }],
            "payable": false
        }]
    });
    std::fs::write(&descriptor, body.to_string()).unwrap();

    let verdict = run_gate(&config(Some(&node.uri()), Some(AGENT), &descriptor)).await;

    assert_eq!(verdict, GateVerdict::Trusted);
}
