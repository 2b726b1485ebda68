//! `latch attach` specs. A fake VM answers the HotSpot attach handshake on
//! a unix socket and plays the payload's part by calling back.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::unix::net::UnixListener;
use std::thread::{self, JoinHandle};

use latch_core::{InjectionArguments, StatusMessage};

use crate::prelude::*;

/// Serve one `load` request for `pid`: report `url` to the callback port (if
/// any), then acknowledge the load. Yields the decoded payload arguments.
fn fake_vm(host: &Host, pid: u32, url: &'static str) -> JoinHandle<(String, InjectionArguments)> {
    let listener = UnixListener::bind(host.tmp().join(format!(".java_pid{pid}"))).unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while request.iter().filter(|b| **b == 0).count() < 5 {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let parts: Vec<String> =
            request.split(|b| *b == 0).map(|p| String::from_utf8_lossy(p).into_owned()).collect();
        assert_eq!(&parts[..4], &["1", "load", "instrument", "false"]);
        let (agent, payload) = parts[4].split_once('=').unwrap();
        let arguments = InjectionArguments::decode(payload).unwrap();

        if let (Some(port), Some(id)) = (arguments.server_port, arguments.id.clone()) {
            let frame = latch_wire::encode_frame(&StatusMessage::success(id, url)).unwrap();
            let mut callback = TcpStream::connect(("127.0.0.1", port)).unwrap();
            callback.write_all(&frame).unwrap();
            callback.shutdown(Shutdown::Write).unwrap();
            let _ = callback.read_to_end(&mut Vec::new());
        }

        stream.write_all(b"0\n0\n").unwrap();
        (agent.to_string(), arguments)
    })
}

#[test]
fn successful_attach_json_report() {
    let host = Host::new();
    host.process(4301, &["/usr/bin/java", "-jar", "shop.jar"]);
    let vm = fake_vm(&host, 4301, "http://localhost:8000/");

    let run = host
        .latch()
        .args(&["attach", "--pid", "4301", "--agent", host.payload(), "--app-name", "shop", "--env", "MODE=dev", "-o", "json"])
        .passes();

    let (agent, arguments) = vm.join().unwrap();
    assert_eq!(agent, std::fs::canonicalize(host.payload()).unwrap().to_str().unwrap());
    let port = arguments.server_port.unwrap();

    let report = run.json();
    similar_asserts::assert_eq!(
        report,
        serde_json::json!([{
            "pid": 4301,
            "command": "/usr/bin/java -jar shop.jar",
            "messages": [{"level": "INFO", "label": "Url", "messsage": "http://localhost:8000/"}],
            "agentArgs": format!(
                r#"{{"environment":{{"MODE":"dev"}},"properties":{{}},"serverPort":{port},"id":"4301","appName":"shop","commandLine":"/usr/bin/java -jar shop.jar"}}"#
            ),
            "success": true,
        }])
    );
}

#[test]
fn successful_attach_plain_report() {
    let host = Host::new();
    host.process(4302, &["java", "com.acme.Server"]);
    let vm = fake_vm(&host, 4302, "http://localhost:9000/");

    let run = host.latch().args(&["attach", "--all", "--agent", host.payload()]).passes();
    vm.join().unwrap();

    similar_asserts::assert_eq!(
        run.stdout(),
        "4302\t-\ttrue\tcom.acme.Server\n    command: java com.acme.Server\n    INFO Url: http://localhost:9000/\n1 attach, 1 succeeded\n"
    );
}

#[test]
fn no_callback_sends_no_port() {
    let host = Host::new();
    host.process(4303, &["java", "com.acme.Server"]);
    let vm = fake_vm(&host, 4303, "http://unused/");

    let run = host
        .latch()
        .args(&["attach", "--pid", "4303", "--agent", host.payload(), "--no-callback", "-o", "json"])
        .passes();

    let (_, arguments) = vm.join().unwrap();
    assert_eq!(arguments.server_port, None);
    assert_eq!(run.json()[0]["success"].as_bool(), Some(false));
    assert_eq!(run.json()[0]["messages"], serde_json::json!([]));
}

#[test]
fn vanished_process_is_recorded_as_error() {
    let host = Host::new();
    host.process(999_999_999, &["java", "-jar", "gone.jar"]);

    let run = host
        .latch()
        .args(&["attach", "--pid", "999999999", "--agent", host.payload(), "-o", "json"])
        .passes();

    let report = run.json();
    assert_eq!(report[0]["pid"].as_u64(), Some(999_999_999));
    assert_eq!(report[0]["success"].as_bool(), Some(false));
    assert_eq!(
        report[0]["messages"],
        serde_json::json!([{"level": "ERROR", "label": "Error", "messsage": "no such process: 999999999"}])
    );
    assert!(!host.tmp().join(".attach_pid999999999").exists());
}

#[test]
fn one_failure_does_not_abort_the_batch() {
    let host = Host::new();
    host.process(4311, &["java", "com.acme.A"])
        .process(999_999_998, &["java", "com.acme.Gone"])
        .process(4313, &["java", "com.acme.C"]);
    let first = fake_vm(&host, 4311, "http://a/");
    let third = fake_vm(&host, 4313, "http://c/");

    let run = host.latch().args(&["attach", "--all", "--agent", host.payload(), "-o", "json"]).passes();
    first.join().unwrap();
    third.join().unwrap();

    let report = run.json();
    let success: Vec<_> = report.as_array().unwrap().iter().map(|r| r["success"].as_bool()).collect();
    // listed in pid order
    assert_eq!(success, vec![Some(true), Some(true), Some(false)]);
    assert_eq!(report[2]["pid"].as_u64(), Some(999_999_998));
    assert_eq!(report[2]["messages"][0]["level"].as_str(), Some("ERROR"));
}

#[test]
fn unknown_pid_exits_one() {
    let host = Host::new();
    host.process(4320, &["java", "com.acme.Server"]);

    host.latch()
        .args(&["attach", "--pid", "123", "--agent", host.payload()])
        .exits(1)
        .stderr_has("no candidate process with id 123")
        .stderr_has("no matching process to attach to");
}

#[test]
fn missing_payload_is_a_usage_error() {
    let host = Host::new();
    host.latch().args(&["attach", "--all"]).exits(2).stderr_has("--agent");
    host.latch().args(&["attach", "--all", "--agent", "/nonexistent/payload.jar"]).exits(2).stderr_has("not found");
}

#[test]
fn selection_is_required() {
    let host = Host::new();
    host.latch().args(&["attach", "--agent", host.payload()]).exits(2);
}
