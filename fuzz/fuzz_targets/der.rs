// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![no_main]

use darkbio_asn1::der::{BitString, DecodeFlags, Name, RdnAttribute, Result, decode, encode};
use libfuzzer_sys::fuzz_target;

// canonicalize decodes one element and re-encodes it. Inputs the decoder
// rejects are skipped; so are decoded values the encoder cannot represent
// (e.g. a time-zone offset pushing a UTCTime out of its year window).
fn canonicalize<T>(
    data: &[u8],
    decode: impl Fn(&[u8]) -> Result<T>,
    encode: impl Fn(&T, Option<&mut [u8]>) -> Result<usize>,
) -> Option<Vec<u8>> {
    let value = decode(data).ok()?;
    let mut buf = vec![0u8; encode(&value, None).ok()?];
    encode(&value, Some(&mut buf)).expect("write pass failed after sizing pass");
    Some(buf)
}

// check asserts that re-encoding is a fixed point: canonicalizing canonical
// bytes must reproduce them exactly.
fn check<T>(
    data: &[u8],
    decode: impl Fn(&[u8]) -> Result<T>,
    encode: impl Fn(&T, Option<&mut [u8]>) -> Result<usize>,
) {
    let Some(first) = canonicalize(data, &decode, &encode) else {
        return;
    };
    let second =
        canonicalize(&first, &decode, &encode).expect("canonical bytes failed to round-trip");
    assert_eq!(first, second, "re-encoding is not canonical");
}

fuzz_target!(|data: &[u8]| {
    let flags = DecodeFlags::default();

    check(data, decode::oid, |v, out| encode::oid(v, out));
    check(
        data,
        |d| decode::name(d, flags).map(Name::into_owned),
        |v, out| encode::name(v, out),
    );
    check(
        data,
        |d| decode::rdn_attribute(d, flags).map(RdnAttribute::into_owned),
        |v, out| encode::rdn_attribute(v, out),
    );
    check(
        data,
        |d| decode::octets(d, flags).map(|blob| blob.into_owned()),
        |v, out| encode::octets(v, out),
    );
    check(
        data,
        |d| decode::bits(d, flags).map(BitString::into_owned),
        |v, out| encode::bits(v, out),
    );
    check(data, decode::int, |v, out| encode::int(*v, out));
    check(data, decode::integer, |v, out| encode::integer(v, out));
    check(data, decode::uinteger, |v, out| encode::uinteger(v, out));
    check(data, decode::enumerated, |v, out| {
        encode::enumerated(*v, out)
    });
    check(data, decode::generalized_time, |v, out| {
        encode::generalized_time(*v, out)
    });
    check(data, decode::choice_of_time, |v, out| {
        encode::choice_of_time(*v, out)
    });
});
