#![allow(dead_code)]

use bytes::Bytes;
use parquet_codec::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

pub const ALL_ENCODINGS: [ByteArrayEncoding; 3] = [
    ByteArrayEncoding::Plain,
    ByteArrayEncoding::DeltaLengthByteArray,
    ByteArrayEncoding::DeltaByteArray,
];

/// Encode `values` with a default-configured codec
pub fn encode_values<V: AsRef<[u8]>>(encoding: ByteArrayEncoding, values: &[V]) -> Vec<u8> {
    let mut encoder = CodecBuilder::new(encoding)
        .build_encoder(Vec::new())
        .unwrap();
    encoder.put_all(values).unwrap();
    encoder.finish().unwrap()
}

/// Decode exactly `count` values from `data`
pub fn decode_values(encoding: ByteArrayEncoding, data: Vec<u8>, count: usize) -> Vec<Bytes> {
    let mut decoder = CodecBuilder::new(encoding)
        .build_decoder(Cursor::new(data))
        .unwrap();
    let mut values = vec![Bytes::new(); count];
    decoder.decode_values(&mut values).unwrap();
    values
}

/// Perform a roundtrip and verify every value survives unchanged
pub fn assert_roundtrip<V: AsRef<[u8]>>(encoding: ByteArrayEncoding, values: &[V]) {
    let data = encode_values(encoding, values);
    let decoded = decode_values(encoding, data, values.len());
    assert_eq!(decoded.len(), values.len());
    for (i, (decoded, original)) in decoded.iter().zip(values).enumerate() {
        assert_eq!(
            decoded.as_ref(),
            original.as_ref(),
            "{} value {} differs",
            encoding,
            i
        );
    }
}

/// Random byte strings with lengths in `0..max_len`
pub fn random_values(seed: u64, count: usize, max_len: usize) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.random_range(0..max_len);
            (0..len).map(|_| rng.random::<u8>()).collect()
        })
        .collect()
}

/// Sorted keys sharing long prefixes, the case prefix compression targets
pub fn sorted_keys(count: usize) -> Vec<String> {
    let mut keys: Vec<String> = (0..count)
        .map(|i| format!("tenant/{:03}/user/{:06}", i % 7, i * 31))
        .collect();
    keys.sort();
    keys
}
