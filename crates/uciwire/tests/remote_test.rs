//! End-to-end tests: the `uciwire` binary against a mocked ubus endpoint.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

struct UbusCall {
    object: &'static str,
    method: &'static str,
}

impl Match for UbusCall {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        body["params"][1] == self.object && body["params"][2] == self.method
    }
}

fn ubus(object: &'static str, method: &'static str) -> UbusCall {
    UbusCall { object, method }
}

fn reply(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

fn network_values() -> Value {
    json!({
        "values": {
            "lan": {
                ".anonymous": false, ".type": "interface", ".name": "lan", ".index": 0,
                "proto": "static", "ipaddr": "192.168.1.1"
            },
            "cfg030f15": {
                ".anonymous": true, ".type": "device", ".name": "cfg030f15", ".index": 1,
                "name": "br-lan", "ports": ["lan1", "lan2"]
            },
            "wan": {
                ".anonymous": false, ".type": "interface", ".name": "wan", ".index": 2,
                "proto": "dhcp"
            }
        }
    })
}

async fn router() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ubus"))
        .and(ubus("uci", "get"))
        .respond_with(reply(json!([0, network_values()])))
        .mount(&server)
        .await;
    server
}

/// Run the binary against `server` with an isolated environment.
async fn run(server: &MockServer, args: &[&str]) -> std::process::Output {
    run_with_env(server, &[], args).await
}

async fn run_with_env(
    server: &MockServer,
    envs: &[(&str, &str)],
    args: &[&str],
) -> std::process::Output {
    let endpoint = format!("{}/ubus", server.uri());
    let dir = tempfile::tempdir().unwrap();
    let envs: Vec<(String, String)> = envs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    let args: Vec<String> = args.iter().map(|s| (*s).to_owned()).collect();

    tokio::task::spawn_blocking(move || {
        let mut cmd = cargo_bin_cmd!("uciwire");
        cmd.env("HOME", dir.path())
            .env("XDG_CONFIG_HOME", dir.path())
            .env("UCIWIRE_ENDPOINT", endpoint)
            .env("RUST_LOG", "off")
            .env_remove("UCIWIRE_PROFILE")
            .env_remove("UCIWIRE_USERNAME")
            .env_remove("UCIWIRE_PASSWORD")
            .env_remove("UCIWIRE_OUTPUT")
            .envs(envs)
            .args(["--color", "never"])
            .args(&args);
        cmd.output().unwrap()
    })
    .await
    .unwrap()
}

async fn calls(server: &MockServer, object: &str, method: &str) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice::<Value>(&r.body).unwrap())
        .filter(|b| b["params"][1] == object && b["params"][2] == method)
        .map(|b| b["params"][3].clone())
        .collect()
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_get_prints_option_value() {
    let server = router().await;
    let output = run(&server, &["get", "network.lan.proto"]).await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).trim(), "static");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_section_prints_type() {
    let server = router().await;
    let output = run(&server, &["get", "network.@device[0]"]).await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).trim(), "device");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_option_exits_not_found() {
    let server = router().await;
    let output = run(&server, &["get", "network.lan.gateway"]).await;
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_plain_uses_uci_notation() {
    let server = router().await;
    let output = run(&server, &["-o", "plain", "show", "network"]).await;
    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("network.lan=interface"), "{text}");
    assert!(text.contains("network.@device[0].ports='lan1' 'lan2'"), "{text}");
    assert!(text.contains("network.wan.proto='dhcp'"), "{text}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_json_filters_by_type() {
    let server = router().await;
    let output = run(&server, &["-o", "json", "show", "network", "-t", "interface"]).await;
    assert!(output.status.success(), "{output:?}");
    let sections: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<_> = sections
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["lan", "wan"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_authenticated_run_closes_its_session() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("session", "login"))
        .respond_with(reply(json!([0, {
            "ubus_rpc_session": "c1ed6c7b025d0caca723a816fa61b668",
            "timeout": 300,
            "expires": 299,
            "acls": {}
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(ubus("session", "destroy"))
        .respond_with(reply(json!([0])))
        .mount(&server)
        .await;

    let output = run_with_env(
        &server,
        &[("UCIWIRE_USERNAME", "root"), ("UCIWIRE_PASSWORD", "admin")],
        &["get", "network.lan.proto"],
    )
    .await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).trim(), "static");

    let destroys = calls(&server, "session", "destroy").await;
    assert_eq!(
        destroys,
        [json!({ "ubus_rpc_session": "c1ed6c7b025d0caca723a816fa61b668" })]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_anonymous_run_sends_no_destroy() {
    let server = router().await;
    let output = run(&server, &["get", "network.lan.proto"]).await;
    assert!(output.status.success(), "{output:?}");
    assert!(calls(&server, "session", "destroy").await.is_empty());
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_set_pushes_option_and_reloads() {
    let server = router().await;
    for call in ["set", "delete"] {
        Mock::given(method("POST"))
            .and(ubus("uci", call))
            .respond_with(reply(json!([0])))
            .mount(&server)
            .await;
    }

    let output = run(&server, &["set", "network.lan.proto=dhcp", "network.lan.ipaddr="]).await;
    assert!(output.status.success(), "{output:?}");

    let sets = calls(&server, "uci", "set").await;
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0]["section"], "lan");
    assert_eq!(sets[0]["values"], json!({ "proto": "dhcp" }));

    // An empty value unsets the option.
    let deletes = calls(&server, "uci", "delete").await;
    assert_eq!(
        deletes,
        [json!({ "config": "network", "section": "lan", "options": ["ipaddr"] })]
    );
    // initial load + post-save reload
    assert_eq!(calls(&server, "uci", "get").await.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_on_unknown_section_is_not_pushed() {
    let server = router().await;
    let output = run(&server, &["set", "network.guest.proto=static"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(calls(&server, "uci", "set").await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_prints_assigned_name() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "add"))
        .respond_with(reply(json!([0, { "section": "cfg0b1234" }])))
        .mount(&server)
        .await;

    let output = run(&server, &["add", "network", "device", "name=br-guest"]).await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout(&output).trim(), "cfg0b1234");

    let adds = calls(&server, "uci", "add").await;
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0]["type"], "device");
    assert_eq!(adds[0]["values"], json!({ "name": "br-guest" }));
    assert!(adds[0].get("name").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_del_list_rewrites_the_list() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "set"))
        .respond_with(reply(json!([0])))
        .mount(&server)
        .await;

    let output = run(&server, &["del-list", "network.@device[0].ports=lan1"]).await;
    assert!(output.status.success(), "{output:?}");

    let sets = calls(&server, "uci", "set").await;
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0]["section"], "cfg030f15");
    assert_eq!(sets[0]["values"], json!({ "ports": ["lan2"] }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reorder_submits_full_order() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "order"))
        .respond_with(reply(json!([0])))
        .mount(&server)
        .await;

    let output = run(&server, &["reorder", "network.wan", "--before", "lan"]).await;
    assert!(output.status.success(), "{output:?}");

    let orders = calls(&server, "uci", "order").await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["sections"], json!(["wan", "lan", "cfg030f15"]));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_section_requires_yes_when_not_interactive() {
    let server = router().await;
    let output = run(&server, &["delete", "network.wan"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(calls(&server, "uci", "delete").await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_section_with_yes() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "delete"))
        .respond_with(reply(json!([0])))
        .mount(&server)
        .await;

    let output = run(&server, &["--yes", "delete", "network.wan"]).await;
    assert!(output.status.success(), "{output:?}");

    let deletes = calls(&server, "uci", "delete").await;
    assert_eq!(deletes, [json!({ "config": "network", "section": "wan" })]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_save_exits_with_rejection_code() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "set"))
        .respond_with(reply(json!([2])))
        .mount(&server)
        .await;

    let output = run(&server, &["set", "network.lan.proto=dhcp"]).await;
    assert_eq!(output.status.code(), Some(5), "{output:?}");
}

// ── Changes / apply ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_changes_plain_lines() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "changes"))
        .respond_with(reply(json!([0, { "changes": {
            "network": [["set", "lan", "proto", "dhcp"], ["remove", "wan6"]]
        }}])))
        .mount(&server)
        .await;

    let output = run(&server, &["-o", "plain", "changes"]).await;
    assert!(output.status.success(), "{output:?}");
    assert_eq!(
        stdout(&output).trim(),
        "network.lan.proto='dhcp'\n-network.wan6"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_confirms() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "apply"))
        .respond_with(reply(json!([0])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(ubus("uci", "confirm"))
        .respond_with(reply(json!([0])))
        .mount(&server)
        .await;

    let output = run(&server, &["apply", "--timeout", "30"]).await;
    assert!(output.status.success(), "{output:?}");

    let applies = calls(&server, "uci", "apply").await;
    assert_eq!(applies, [json!({ "timeout": 30, "rollback": true })]);
    assert_eq!(calls(&server, "uci", "confirm").await.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_apply_rejected_exit_code() {
    let server = router().await;
    Mock::given(method("POST"))
        .and(ubus("uci", "apply"))
        .respond_with(reply(json!([5])))
        .mount(&server)
        .await;

    let output = run(&server, &["apply"]).await;
    assert_eq!(output.status.code(), Some(5), "{output:?}");
    assert!(calls(&server, "uci", "confirm").await.is_empty());
}
