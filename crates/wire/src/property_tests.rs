// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for the frame decoder.

use latch_core::{Level, StatusMessage};
use proptest::prelude::*;

use super::{decode_frame, encode_frame};

fn arb_level() -> impl Strategy<Value = Level> {
    prop_oneof![Just(Level::Info), Just(Level::Warn), Just(Level::Error)]
}

proptest! {
    #[test]
    fn decode_never_panics_on_arbitrary_bytes(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_frame(&bytes);
    }

    #[test]
    fn encoded_frames_decode_to_the_same_message(
        id in "[0-9]{1,7}",
        level in arb_level(),
        label in ".{0,16}",
        message in ".{0,64}",
    ) {
        let original = StatusMessage::new(id, level, label, message);
        let frame = encode_frame(&original).expect("encode");
        prop_assert_eq!(decode_frame(&frame).expect("decode"), original);
    }
}
