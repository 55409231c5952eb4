#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use pretty_assertions::assert_eq;
use uciwire_core::{OptionValue, Overlay, Section, SectionRef};

use common::{MockService, network};

async fn loaded() -> Overlay<MockService> {
    let overlay = Overlay::new(network());
    overlay.load("network").await.unwrap();
    overlay
}

fn names(sections: &[Section]) -> Vec<&str> {
    sections.iter().map(|s| s.name.as_str()).collect()
}

// ── Loading ─────────────────────────────────────────────────────────

#[tokio::test]
async fn load_is_memoized() {
    let overlay = loaded().await;
    overlay.load("network").await.unwrap();
    overlay.load_all(["network"]).await.unwrap();
    assert_eq!(overlay.service().count("get"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_loads_share_one_request() {
    let service = network();
    service.set_get_delay(Duration::from_millis(50));
    let overlay = Overlay::new(service);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let overlay = overlay.clone();
            tokio::spawn(async move { overlay.load("network").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(overlay.service().count("get"), 1);
    assert!(overlay.is_loaded("network"));
}

#[tokio::test]
async fn failed_load_is_retried() {
    let overlay = Overlay::new(network());
    overlay.service().fail_on("get");
    assert!(overlay.load("network").await.is_err());
    assert!(!overlay.is_loaded("network"));
    assert_eq!(overlay.sections("network", None), vec![]);

    overlay.service().succeed();
    overlay.load("network").await.unwrap();
    assert!(overlay.is_loaded("network"));
    assert_eq!(overlay.service().count("get"), 2);
}

#[tokio::test]
async fn unload_discards_cache_and_pending_state() {
    let overlay = loaded().await;
    overlay.set("network", "lan", "proto", "dhcp");
    overlay.unload("network");

    assert!(!overlay.is_loaded("network"));
    assert!(overlay.pending().is_empty());

    overlay.load("network").await.unwrap();
    assert_eq!(overlay.get("network", "lan", "proto"), Some("static".into()));
    assert_eq!(overlay.service().count("get"), 2);
}

// ── Queries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn sections_by_type() {
    let overlay = loaded().await;
    assert_eq!(
        names(&overlay.sections("network", Some("interface"))),
        vec!["loopback", "lan", "wan"]
    );
    assert_eq!(names(&overlay.sections("network", Some("device"))), vec!["cfg030f15"]);
    assert_eq!(overlay.sections("network", Some("route")), vec![]);
    assert_eq!(overlay.sections("dhcp", None), vec![]);
}

#[tokio::test]
async fn list_options_come_back_as_lists() {
    let overlay = loaded().await;
    assert_eq!(
        overlay.get("network", "@device[0]", "ports"),
        Some(OptionValue::from(vec!["lan1", "lan2"]))
    );
}

#[tokio::test]
async fn resolver_boundaries() {
    let overlay = loaded().await;
    assert_eq!(overlay.resolve("network", "@interface[0]").as_deref(), Some("loopback"));
    assert_eq!(overlay.resolve("network", "@interface[-1]").as_deref(), Some("wan"));
    assert_eq!(overlay.resolve("network", "@interface[3]"), None);
    assert_eq!(overlay.resolve("network", "@interface[-4]"), None);
    assert_eq!(overlay.resolve("network", "anything").as_deref(), Some("anything"));
    assert_eq!(overlay.get("network", "@interface[9]", "proto"), None);
}

#[tokio::test]
async fn merge_precedence_whole_delete_wins() {
    let overlay = loaded().await;
    overlay.set("network", "lan", "proto", "dhcp");
    overlay.set("network", "lan", "mtu", "1400");
    overlay.remove("network", "lan");

    for opt in ["proto", "ipaddr", "mtu"] {
        assert_eq!(overlay.get("network", "lan", opt), None, "{opt}");
    }
    assert_eq!(overlay.section("network", "lan"), None);
}

#[tokio::test]
async fn section_strips_deleted_options() {
    let overlay = loaded().await;
    overlay.unset("network", "lan", "ipaddr");
    overlay.set("network", "lan", "proto", "dhcp");

    let lan = overlay.section("network", "lan").unwrap();
    assert_eq!(lan.get("proto"), Some(&OptionValue::from("dhcp")));
    assert!(!lan.has_option("ipaddr"));

    let listed = overlay
        .sections("network", Some("interface"))
        .into_iter()
        .find(|s| s.name == "lan")
        .unwrap();
    assert_eq!(listed, lan);
}

#[tokio::test]
async fn first_helpers() {
    let overlay = loaded().await;
    assert_eq!(
        overlay.first_section("network", None).map(|s| s.name),
        Some("loopback".to_owned())
    );
    assert_eq!(
        overlay.get_first("network", Some("device"), "name"),
        Some("br-lan".into())
    );

    overlay.set_first("network", Some("interface"), "auto", "0");
    assert_eq!(overlay.get("network", "loopback", "auto"), Some("0".into()));

    overlay.unset_first("network", Some("interface"), "ipaddr");
    assert_eq!(overlay.get("network", "loopback", "ipaddr"), None);
    assert_eq!(overlay.get("network", "lan", "ipaddr"), Some("192.168.1.1".into()));
}

#[tokio::test]
async fn get_bool_truth_table() {
    let overlay = loaded().await;
    for (n, raw) in ["1", "on", "TRUE", "Yes", "enabled"].iter().enumerate() {
        let opt = format!("t{n}");
        overlay.set("network", "lan", &opt, *raw);
        assert!(overlay.get_bool("network", "lan", &opt), "{raw}");
    }
    for (n, raw) in ["0", "off", "false", "no", "disabled", "random"].iter().enumerate() {
        let opt = format!("f{n}");
        overlay.set("network", "lan", &opt, *raw);
        assert!(!overlay.get_bool("network", "lan", &opt), "{raw}");
    }
    overlay.set("network", "lan", "empty", "");
    assert!(!overlay.get_bool("network", "lan", "empty"));
    assert!(!overlay.get_bool("network", "lan", "absent"));
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn set_unset_round_trip() {
    let overlay = loaded().await;
    overlay.set("network", "lan", "ipaddr", "10.0.0.1");
    assert_eq!(overlay.get("network", "lan", "ipaddr"), Some("10.0.0.1".into()));
    overlay.unset("network", "lan", "ipaddr");
    assert_eq!(overlay.get("network", "lan", "ipaddr"), None);

    overlay.set("network", "lan", "gateway", "10.0.0.254");
    overlay.unset("network", "lan", "gateway");
    assert_eq!(overlay.get("network", "lan", "gateway"), None);
    assert_eq!(overlay.pending(), vec!["network".to_owned()]);
}

#[tokio::test]
async fn set_cannot_create_sections() {
    let overlay = loaded().await;
    overlay.set("network", "guest", "proto", "static");
    overlay.set("network", "@interface[7]", "proto", "static");
    overlay.set("dhcp", "lan", "start", "100");
    assert_eq!(overlay.get("network", "guest", "proto"), None);
    assert!(overlay.pending().is_empty());
}

#[tokio::test]
async fn metadata_options_are_ignored() {
    let overlay = loaded().await;
    overlay.set("network", "lan", ".type", "device");
    overlay.unset("network", "lan", ".name");
    assert!(overlay.pending().is_empty());
}

#[tokio::test]
async fn add_sorts_after_existing_sections() {
    let overlay = loaded().await;
    let first = overlay.add("network", "interface", None);
    let second = overlay.add("network", "interface", Some("guest"));
    assert!(first.starts_with("new"));
    assert_eq!(second, "guest");

    let list = overlay.sections("network", Some("interface"));
    assert_eq!(
        names(&list),
        vec!["loopback", "lan", "wan", first.as_str(), "guest"]
    );
    assert_eq!(list.iter().map(|s| s.index).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert!(list[3].anonymous);
    assert!(!list[4].anonymous);
}

#[tokio::test]
async fn add_with_taken_name_records_nothing() {
    let overlay = loaded().await;
    assert_eq!(overlay.add("network", "interface", Some("lan")), "lan");
    assert!(overlay.pending().is_empty());
}

#[tokio::test]
async fn add_cannot_reuse_a_deleted_name() {
    let overlay = loaded().await;
    overlay.remove("network", "wan");
    assert_eq!(overlay.add("network", "interface", Some("wan")), "wan");

    assert_eq!(overlay.section("network", "wan"), None);
    let names: Vec<String> = overlay
        .sections("network", None)
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert!(!names.contains(&"wan".to_owned()));
}

#[tokio::test]
async fn anonymous_ids_are_unique() {
    let overlay = loaded().await;
    let mut ids = std::collections::HashSet::new();
    for _ in 0..10_000 {
        let sid = overlay.add("network", "host", None);
        assert!(overlay.section("network", &sid).is_some());
        assert!(ids.insert(sid));
    }
    assert_eq!(overlay.sections("network", Some("host")).len(), 10_000);
}

#[tokio::test]
async fn clone_copies_effective_options() {
    let overlay = loaded().await;
    overlay.set("network", "lan", "proto", "dhcp");
    overlay.unset("network", "lan", "ipaddr");

    let sid = overlay
        .clone_section("network", "interface", "lan", true, Some("lan2"))
        .unwrap();
    assert_eq!(sid, "lan2");
    assert_eq!(overlay.get("network", "lan2", "proto"), Some("dhcp".into()));
    assert_eq!(overlay.get("network", "lan2", "ipaddr"), None);
    assert_eq!(
        names(&overlay.sections("network", Some("interface"))),
        vec!["loopback", "lan", "lan2", "wan"]
    );

    assert_eq!(overlay.clone_section("network", "interface", "ghost", false, None), None);
}

#[tokio::test]
async fn move_semantics() {
    let source = || {
        MockService::new().with_config(
            "firewall",
            vec![
                Section::new("A", "rule", 0),
                Section::new("B", "rule", 0),
                Section::new("C", "rule", 0),
            ],
        )
    };
    let order = |overlay: &Overlay<MockService>| -> Vec<String> {
        overlay
            .sections("firewall", None)
            .into_iter()
            .map(|s| s.name)
            .collect()
    };

    let overlay = Overlay::new(source());
    overlay.load("firewall").await.unwrap();
    assert!(overlay.move_section("firewall", "C", Some("A".into()), false));
    assert_eq!(order(&overlay), vec!["C", "A", "B"]);

    let overlay = Overlay::new(source());
    overlay.load("firewall").await.unwrap();
    assert!(overlay.move_section("firewall", "C", Some("A".into()), true));
    assert_eq!(order(&overlay), vec!["A", "C", "B"]);

    let overlay = Overlay::new(source());
    overlay.load("firewall").await.unwrap();
    assert!(overlay.move_section("firewall", "A", None, false));
    assert_eq!(order(&overlay), vec!["B", "C", "A"]);

    assert!(!overlay.move_section("firewall", "Z", None, false));
    assert!(!overlay.move_section("firewall", "A", Some(SectionRef::from("@rule[3]")), false));
    assert_eq!(order(&overlay), vec!["B", "C", "A"]);
}

#[tokio::test]
async fn indices_contiguous_after_mixed_operations() {
    let overlay = loaded().await;
    let x = overlay.add("network", "interface", None);
    overlay.remove("network", "loopback");
    let y = overlay.add("network", "device", None);
    overlay.move_section("network", &y, Some("lan".into()), false);
    overlay.move_section("network", "@interface[0]", None, false);
    overlay.remove("network", &x);

    let list = overlay.sections("network", None);
    let indices: Vec<usize> = list.iter().map(|s| s.index).collect();
    assert_eq!(indices, (0..list.len()).collect::<Vec<_>>());
    assert_eq!(names(&list), vec![y.as_str(), "cfg030f15", "wan", "lan"]);
}
