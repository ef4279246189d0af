mod utils;

use bitpipe::{StreamDecoder, StreamEncoder};
use proptest::prelude::*;
use utils::{chunks_of, rechunk, u32_bits, Utf8Str, U32Be};

proptest! {
    // Chunk boundaries must never affect decoded output: whatever the chunk
    // size, encode-then-decode is the identity.
    #[test]
    fn u32_roundtrip_rechunked(
        values in prop::collection::vec(any::<u32>(), 0..64),
        chunk_size in 1..128usize,
    ) {
        let bits = StreamEncoder::many(U32Be).encode_all_valid(values.clone());

        let decoded: Result<Vec<_>, _> = StreamDecoder::many(U32Be)
            .decode(chunks_of(&bits, chunk_size))
            .collect();
        prop_assert_eq!(decoded.unwrap(), values);
    }

    // Same, at arbitrary irregular split points with empty chunks
    // interleaved.
    #[test]
    fn u32_roundtrip_irregular_splits(
        values in prop::collection::vec(any::<u32>(), 0..64),
        splits in prop::collection::vec(1..96usize, 1..40),
    ) {
        let bits = StreamEncoder::many(U32Be).encode_all_valid(values.clone());

        let decoded: Result<Vec<_>, _> = StreamDecoder::many(U32Be)
            .decode(rechunk(&bits, &splits))
            .collect();
        prop_assert_eq!(decoded.unwrap(), values);
    }

    // Variable-width elements survive rechunking just the same.
    #[test]
    fn string_roundtrip_rechunked(
        values in prop::collection::vec(".{0,40}", 0..12),
        chunk_size in 1..64usize,
    ) {
        let bits = StreamEncoder::many(Utf8Str).encode_all_valid(values.clone());

        let decoded: Result<Vec<_>, _> = StreamDecoder::many(Utf8Str)
            .decode(chunks_of(&bits, chunk_size))
            .collect();
        prop_assert_eq!(decoded.unwrap(), values);
    }

    // The strict one-shot adapter agrees with the incremental interface.
    #[test]
    fn decode_all_matches_incremental_decode(
        values in prop::collection::vec(any::<u32>(), 0..32),
    ) {
        let bits = u32_bits(&values);

        let (decoded, remainder) = StreamDecoder::many(U32Be).decode_all(&bits).unwrap();
        prop_assert_eq!(decoded, values);
        prop_assert!(remainder.is_empty());
    }

    // A fixed emission is produced exactly once however many values flow by.
    #[test]
    fn emit_is_invariant_to_input(values in prop::collection::vec(any::<u32>(), 0..16)) {
        let header = u32_bits(&[0xCAFE_F00D]);

        let chunks: Result<Vec<_>, _> = StreamEncoder::emit(header.clone())
            .encode(values)
            .collect();
        prop_assert_eq!(chunks.unwrap(), vec![header]);
    }

    // Header-framed messages round-trip: the decoder skips the header the
    // encoder prepends.
    #[test]
    fn framed_roundtrip(
        values in prop::collection::vec(any::<u32>(), 0..32),
        chunk_size in 1..64usize,
    ) {
        let header = u32_bits(&[0x1234_5678]);
        let encoder = StreamEncoder::emit(header.clone()).then(|| StreamEncoder::many(U32Be));
        let bits = encoder.encode_all_valid(values.clone());

        let decoder = StreamDecoder::ignore(header.len() as u64).then(|| StreamDecoder::many(U32Be));
        let decoded: Result<Vec<_>, _> = decoder.decode(chunks_of(&bits, chunk_size)).collect();
        prop_assert_eq!(decoded.unwrap(), values);
    }
}
