#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Attempt to deserialize arbitrary bytes as various BURST types.
    // The goal is to ensure deserialization never panics on malformed input.

    // Try decoding as a canonical Block (§6 "Block wire format").
    let _ = burst_ledger::decode(data);

    // Try deserializing as a BlockHash
    let _ = bincode::deserialize::<burst_types::BlockHash>(data);

    // Try deserializing as a Timestamp
    let _ = bincode::deserialize::<burst_types::Timestamp>(data);

    // Try deserializing as a Signature
    let _ = bincode::deserialize::<burst_types::Signature>(data);
});
