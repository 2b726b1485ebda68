//! `latch send` specs.

use std::io::Read;
use std::net::TcpListener;
use std::thread;

use latch_core::{Level, StatusMessage};

use crate::prelude::*;

#[test]
fn delivers_one_frame() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let receiver = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut frame = Vec::new();
        stream.read_to_end(&mut frame).unwrap();
        latch_wire::decode_frame(&frame).unwrap()
    });

    cli()
        .args(&["send", "--port", &port, "--id", "42", "--level", "ERROR", "--label", "Oops", "bad"])
        .passes();

    assert_eq!(receiver.join().unwrap(), StatusMessage::new("42", Level::Error, "Oops", "bad"));
}

#[test]
fn level_defaults_to_info() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port().to_string();
    let receiver = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut frame = Vec::new();
        stream.read_to_end(&mut frame).unwrap();
        latch_wire::decode_frame(&frame).unwrap()
    });

    cli().args(&["send", "--port", &port, "--id", "7", "--label", "Url", "http://localhost:1/"]).passes();

    let message = receiver.join().unwrap();
    assert_eq!(message.level, Level::Info);
    assert!(message.is_success());
}

#[test]
fn unreachable_listener_exits_one() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port().to_string()
    };

    cli()
        .args(&["send", "--port", &port, "--id", "1", "--label", "x", "y"])
        .exits(1)
        .stderr_has("cannot deliver status message");
}

#[test]
fn unknown_level_is_rejected() {
    cli().args(&["send", "--port", "1", "--id", "1", "--level", "LOUD", "--label", "x", "y"]).exits(2);
}
