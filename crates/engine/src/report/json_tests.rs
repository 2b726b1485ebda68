// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::report::SharedBuffer;

fn sink() -> (JsonSink, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::new();
    let err = SharedBuffer::new();
    let sink = JsonSink::new(Box::new(out.clone()), Box::new(err.clone()));
    (sink, out, err)
}

fn attach(sink: &JsonSink, target: &Target, messages: Vec<StatusMessage>) {
    sink.attach_started(target, &InjectionArguments::new().for_target(target, Some(17400)));
    for message in messages {
        sink.write(message);
    }
    sink.attach_finished();
}

#[test]
fn single_successful_attach_shape() {
    let (sink, out, _) = sink();
    let target = Target::new("42", "app.jar");
    attach(&sink, &target, vec![StatusMessage::success("42", "http://localhost:8000/")]);
    sink.finished();

    similar_asserts::assert_eq!(
        out.contents(),
        concat!(
            r#"[{"pid":42,"command":"app.jar","messages":[{"level":"INFO","label":"Url","messsage":"http://localhost:8000/"}],"#,
            r#""agentArgs":"{\"environment\":{},\"properties\":{},\"serverPort\":17400,\"id\":\"42\",\"commandLine\":\"app.jar\"}","success":true}]"#,
            "\n"
        )
    );
}

#[test]
fn success_needs_url_label_anywhere() {
    let (sink, out, _) = sink();
    attach(
        &sink,
        &Target::new("1", "A"),
        vec![
            StatusMessage::error("1", "Error", "first"),
            StatusMessage::success("1", "http://a/"),
            StatusMessage::warn("1", "Agent", "after"),
        ],
    );
    attach(&sink, &Target::new("2", "B"), vec![StatusMessage::info("2", "Agent", "url-less")]);
    sink.finished();

    let report: serde_json::Value = serde_json::from_str(&out.contents()).unwrap();
    assert_eq!(report[0]["success"], true);
    assert_eq!(report[0]["messages"].as_array().unwrap().len(), 3);
    assert_eq!(report[1]["success"], false);
}

#[test]
fn non_numeric_pid_rendered_as_string() {
    let (sink, out, _) = sink();
    attach(&sink, &Target::new("vm-7", "Main"), vec![]);
    sink.finished();
    let report: serde_json::Value = serde_json::from_str(&out.contents()).unwrap();
    assert_eq!(report[0]["pid"], "vm-7");
    assert_eq!(report[0]["messages"], serde_json::json!([]));
}

#[test]
fn straggler_dropped_with_diagnostic() {
    let (sink, out, err) = sink();
    attach(&sink, &Target::new("1", "A"), vec![]);
    sink.write(StatusMessage::success("1", "http://late/"));
    sink.finished();

    let report: serde_json::Value = serde_json::from_str(&out.contents()).unwrap();
    assert_eq!(report[0]["success"], false);
    assert_eq!(err.contents(), "dropped [1] INFO Url: http://late/\n");
}

#[test]
fn finished_is_idempotent_and_seals_open_record() {
    let (sink, out, _) = sink();
    let target = Target::new("5", "Main");
    sink.attach_started(&target, &InjectionArguments::new());
    sink.write(StatusMessage::info("5", "Agent", "hi"));
    sink.finished();
    sink.finished();

    assert_eq!(out.contents().lines().count(), 1);
    let report: serde_json::Value = serde_json::from_str(&out.contents()).unwrap();
    assert_eq!(report[0]["messages"][0]["messsage"], "hi");
}

#[test]
fn empty_batch_renders_empty_array() {
    let (sink, out, _) = sink();
    sink.finished();
    assert_eq!(out.contents(), "[]\n");
}

#[test]
fn listing_mode_with_identity() {
    let (sink, out, err) = sink();
    sink.list(&Target::new("10", "Main").with_vm_version("17"));
    sink.list(&Target::new("11", "Other").with_attachable(false));
    sink.write(StatusMessage::info("10", "Identity", "shop, admin"));
    sink.finished();

    similar_asserts::assert_eq!(
        out.contents(),
        concat!(
            r#"[{"pid":10,"vmVersion":"17","attachable":true,"displayName":"Main","applicationNames":["shop","admin"]},"#,
            r#"{"pid":11,"vmVersion":null,"attachable":false,"displayName":"Other"}]"#,
            "\n"
        )
    );
    assert_eq!(err.contents(), "");
}
