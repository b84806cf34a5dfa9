#![no_main]
//! Fuzz test for the pgoutput decoder and adapter
//!
//! Malformed replication messages must be rejected with an error, never a
//! panic, and whatever the adapter accepts must format cleanly.

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use pgtext::postgres::{PgOutputAdapter, PgOutputDecoder};
use pgtext::{ChangeFormatter, FormatterConfig, VecSink};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes
    let mut bytes = Bytes::copy_from_slice(data);
    let _ = PgOutputDecoder::decode(&mut bytes);

    // Every message type prefix
    for prefix in [b'B', b'C', b'R', b'I', b'U', b'D', b'O', b'Y', b'T', b'S', b'E', b'c', b'A'] {
        let mut prefixed = vec![prefix];
        prefixed.extend_from_slice(data);
        let mut bytes = Bytes::from(prefixed);
        let _ = PgOutputDecoder::decode(&mut bytes);
    }

    // Truncated input at various lengths
    for len in (0..data.len()).step_by(data.len().max(1) / 10 + 1) {
        let mut bytes = Bytes::copy_from_slice(&data[..len]);
        let _ = PgOutputDecoder::decode(&mut bytes);
    }

    // Messages split on 0xFF run through adapter and both dialects
    let mut adapter = PgOutputAdapter::new();
    let mut json = ChangeFormatter::new(FormatterConfig::json());
    let mut plain = ChangeFormatter::new(FormatterConfig::plain());
    let mut sink = VecSink::new();
    for chunk in data.split(|&b| b == 0xFF) {
        let mut bytes = Bytes::copy_from_slice(chunk);
        if let Ok(Some(event)) = adapter.decode_and_apply(&mut bytes) {
            let _ = json.handle(&event, &mut sink);
            let _ = plain.handle(&event, &mut sink);
        }
    }
});
