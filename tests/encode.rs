mod utils;

use bitpipe::{BitBuffer, CodecError, Error, StreamEncoder};
use utils::{byte_bits, u32_bits, FailingEncoder, U32Be};

#[test]
fn emit_emits_once_over_empty_input() {
    let header = byte_bits(0xAB);

    let chunks: Result<Vec<_>, _> = StreamEncoder::<u32>::emit(header.clone())
        .encode(Vec::new())
        .collect();
    assert_eq!(chunks.unwrap(), vec![header]);
}

#[test]
fn emit_emits_once_and_leaves_values_untouched() {
    let header = byte_bits(0xAB);

    let mut iter = StreamEncoder::emit(header.clone()).encode(vec![1u32, 2, 3]);
    let chunks: Result<Vec<_>, _> = (&mut iter).collect();
    assert_eq!(chunks.unwrap(), vec![header]);

    let leftover: Vec<_> = iter.into_remainder().expect("values untouched").collect();
    assert_eq!(leftover, vec![1, 2, 3]);
}

#[test]
fn many_encodes_every_value() {
    let chunks: Result<Vec<_>, _> = StreamEncoder::many(U32Be).encode(vec![1, 2, 3]).collect();
    let chunks = chunks.unwrap();

    assert_eq!(chunks.len(), 3);
    let mut bits = BitBuffer::new();
    for chunk in &chunks {
        bits.extend_from_bitslice(chunk);
    }
    assert_eq!(bits, u32_bits(&[1, 2, 3]));
}

#[test]
fn once_encodes_one_value_and_leaves_the_rest() {
    let mut iter = StreamEncoder::once(U32Be).encode(vec![1, 2, 3]);
    let chunks: Result<Vec<_>, _> = (&mut iter).collect();
    assert_eq!(chunks.unwrap(), vec![u32_bits(&[1])]);

    let leftover: Vec<_> = iter.into_remainder().expect("two values left").collect();
    assert_eq!(leftover, vec![2, 3]);
}

#[test]
fn once_failure_fails_the_whole_operation() {
    let chunks: Vec<_> = StreamEncoder::once(FailingEncoder).encode(vec![1]).collect();
    assert_eq!(chunks, vec![Err(Error::Encode(CodecError::message("refused")))]);
}

#[test]
fn try_once_failure_leaves_value_for_next_encoder() {
    // The failing encoder is skipped silently; the working one still sees
    // every value, the skipped one included.
    let encoder = StreamEncoder::try_once(FailingEncoder).then(|| StreamEncoder::many(U32Be));

    let bits = encoder.encode_all_valid(vec![7, 8]);
    assert_eq!(bits, u32_bits(&[7, 8]));
}

#[test]
fn try_once_failure_emits_nothing_and_does_not_consume() {
    let mut iter = StreamEncoder::try_once(FailingEncoder).encode(vec![7, 8]);
    let chunks: Result<Vec<_>, _> = (&mut iter).collect();
    assert_eq!(chunks.unwrap(), Vec::<BitBuffer>::new());

    // The value the encoder choked on is pushed back, not dropped.
    let leftover: Vec<_> = iter.into_remainder().expect("nothing consumed").collect();
    assert_eq!(leftover, vec![7, 8]);
}

#[test]
fn try_once_success_behaves_like_once() {
    let mut iter = StreamEncoder::try_once(U32Be).encode(vec![7, 8]);
    let chunks: Result<Vec<_>, _> = (&mut iter).collect();
    assert_eq!(chunks.unwrap(), vec![u32_bits(&[7])]);

    let leftover: Vec<_> = iter.into_remainder().expect("one value left").collect();
    assert_eq!(leftover, vec![8]);
}

#[test]
fn header_then_body() {
    let header = byte_bits(0xFF);
    let encoder = StreamEncoder::emit(header.clone()).then(|| StreamEncoder::many(U32Be));

    let bits = encoder.encode_all_valid(vec![1, 2]);
    let mut expected = header;
    expected.extend_from_bitslice(&u32_bits(&[1, 2]));
    assert_eq!(bits, expected);
}

#[test]
fn then_is_skipped_once_input_is_consumed() {
    // `many` drains the input completely, so the appended trailer never
    // runs.
    let encoder = StreamEncoder::many(U32Be).then(|| StreamEncoder::emit(byte_bits(0xEE)));

    let bits = encoder.encode_all_valid(vec![1, 2]);
    assert_eq!(bits, u32_bits(&[1, 2]));
}

#[test]
fn empty_encoder_emits_nothing() {
    let mut iter = StreamEncoder::empty().encode(vec![1u32, 2]);
    let chunks: Result<Vec<_>, _> = (&mut iter).collect();
    assert_eq!(chunks.unwrap(), Vec::<BitBuffer>::new());

    let leftover: Vec<_> = iter.into_remainder().expect("values untouched").collect();
    assert_eq!(leftover, vec![1, 2]);
}

#[test]
fn encode_all_valid_concatenates_everything() {
    let bits = StreamEncoder::many(U32Be).encode_all_valid(vec![9, 10, 11]);
    assert_eq!(bits, u32_bits(&[9, 10, 11]));
}

#[test]
#[should_panic(expected = "encoding failed")]
fn encode_all_valid_panics_on_failure() {
    StreamEncoder::once(FailingEncoder).encode_all_valid(vec![1]);
}

#[test]
fn encoder_values_are_reusable() {
    let encoder = StreamEncoder::many(U32Be);

    for _ in 0..3 {
        let bits = encoder.clone().encode_all_valid(vec![4, 5]);
        assert_eq!(bits, u32_bits(&[4, 5]));
    }
}
