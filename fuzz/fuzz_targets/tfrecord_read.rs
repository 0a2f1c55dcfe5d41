//! Fuzz target for TFRecord reading and Example decoding.
//!
//! Run with:
//!   cargo +nightly fuzz run tfrecord_read

#![no_main]

use libfuzzer_sys::fuzz_target;
use prost::Message;
use synthrec::ir::io_tfrecord::TfRecordReader;
use synthrec::ir::Example;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    for record in TfRecordReader::new(data) {
        match record {
            Ok(payload) => {
                let _ = Example::decode(payload.as_slice());
            }
            Err(_) => break,
        }
    }
});
