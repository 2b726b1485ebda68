//! `latch list` specs against a fake process table.

use crate::prelude::*;

fn host() -> Host {
    let host = Host::new();
    host.process(4101, &["/usr/bin/java", "-Xmx1g", "-jar", "shop.jar", "--port", "8080"])
        .process(4102, &["/opt/jdk/bin/java", "-cp", "lib/*", "com.acme.Worker"])
        .process(4103, &["java", "org.gradle.launcher.daemon.bootstrap.GradleDaemon", "8.5"])
        .process(4104, &["/usr/bin/python3", "app.py"])
        .process(4105, &["java", "-version"]);
    host
}

#[test]
fn lists_candidate_jvms_as_tab_separated_lines() {
    let host = host();
    let run = host.latch().args(&["list"]).passes();
    similar_asserts::assert_eq!(run.stdout(), "4101\t-\ttrue\tshop.jar --port 8080\n4102\t-\ttrue\tcom.acme.Worker\n");
}

#[test]
fn exclude_adds_to_the_deny_list() {
    let host = host();
    host.latch()
        .args(&["list", "--exclude", "acme"])
        .passes()
        .stdout_has("shop.jar")
        .stdout_lacks("com.acme.Worker");
}

#[test]
fn foreign_processes_are_not_attachable() {
    let host = Host::new();
    host.process_as(4201, 4_000_000_000, &["java", "com.other.Main"]);
    let run = host.latch().args(&["list", "-o", "json"]).passes();
    let listing = run.json();
    assert_eq!(listing[0]["displayName"].as_str(), Some("com.other.Main"));
    // root may attach to anything
    assert_eq!(listing[0]["attachable"].as_bool(), Some(host.uid() == 0));
}

#[test]
fn json_listing() {
    let host = host();
    let run = host.latch().args(&["list", "-o", "json"]).passes();
    similar_asserts::assert_eq!(
        run.json(),
        serde_json::json!([
            {"pid": 4101, "vmVersion": null, "attachable": true, "displayName": "shop.jar --port 8080"},
            {"pid": 4102, "vmVersion": null, "attachable": true, "displayName": "com.acme.Worker"},
        ])
    );
}

#[test]
fn empty_process_table() {
    let host = Host::new();
    host.latch().args(&["list"]).passes();
    let run = host.latch().args(&["list", "-o", "json"]).passes();
    assert_eq!(run.stdout(), "[]\n");
}

#[test]
fn identify_needs_a_payload() {
    let host = host();
    host.latch().args(&["list", "--identify"]).exits(2).stderr_has("LATCH_AGENT");
}
