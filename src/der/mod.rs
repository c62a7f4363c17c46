// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! DER codec for a fixed catalog of certificate structures.
//!
//! https://www.itu.int/rec/T-REC-X.690
//!
//! This is not a general ASN.1 implementation: only the handful of universal
//! types that the certificate and message codecs need are supported, always
//! in their canonical (DER) form. Encoders run twice over the same logic, a
//! sizing pass that counts bytes and a write pass that emits them, so the
//! caller can size a buffer first. Decoders give back typed values and can
//! alias the input buffer instead of copying (see [`DecodeFlags`]).

pub mod decode;
pub mod encode;

mod error;
mod time;
mod types;

pub use error::{Error, Result};
pub use time::FileTime;
pub use types::{
    BitString, DecodeFlags, IntegerBlob, Name, NameValue, Rdn, RdnAttribute, StringKind, Value,
};

// The ASN.1 tags that appear in the supported structures.
pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_OBJECT_ID: u8 = 0x06;
pub const TAG_ENUMERATED: u8 = 0x0a;
pub const TAG_NUMERIC_STRING: u8 = 0x12;
pub const TAG_PRINTABLE_STRING: u8 = 0x13;
pub const TAG_IA5_STRING: u8 = 0x16;
pub const TAG_UTC_TIME: u8 = 0x17;
pub const TAG_GENERALIZED_TIME: u8 = 0x18;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_SET_OF: u8 = 0x31;

// A length field may carry at most this many value octets.
const MAX_LENGTH_OCTETS: usize = 4;

// Sink is the output target of an encoding pass: the sizing pass counts the
// bytes an encoder would emit, the write pass emits them into a buffer that
// the driver has already verified to be large enough.
pub(crate) enum Sink<'a> {
    Measure(usize),
    Write { buf: &'a mut [u8], pos: usize },
}

impl Sink<'_> {
    // put appends a run of bytes to the sink.
    pub(crate) fn put(&mut self, bytes: &[u8]) {
        match self {
            Sink::Measure(count) => *count += bytes.len(),
            Sink::Write { buf, pos } => {
                buf[*pos..*pos + bytes.len()].copy_from_slice(bytes);
                *pos += bytes.len();
            }
        }
    }

    // put_byte appends a single byte to the sink.
    pub(crate) fn put_byte(&mut self, byte: u8) {
        self.put(&[byte]);
    }

    // produced returns the number of bytes counted or written so far.
    pub(crate) fn produced(&self) -> usize {
        match self {
            Sink::Measure(count) => *count,
            Sink::Write { pos, .. } => *pos,
        }
    }
}

// put_length emits a DER length field in its shortest form: one octet for
// lengths up to 0x7f, otherwise a count octet followed by the big-endian
// length octets.
pub(crate) fn put_length(sink: &mut Sink<'_>, len: usize) {
    if len <= 0x7f {
        sink.put_byte(len as u8);
    } else {
        let significant = size_of::<usize>() - len.leading_zeros() as usize / 8;
        sink.put_byte(0x80 | significant as u8);
        sink.put(&len.to_be_bytes()[size_of::<usize>() - significant..]);
    }
}

// content_length parses the length field of the element starting at data[0]
// (the tag octet) and returns the content length together with the number of
// length octets. The element's content must lie entirely within data.
pub(crate) fn content_length(data: &[u8]) -> Result<(usize, usize)> {
    if data.len() <= 1 {
        return Err(Error::UnexpectedEod);
    }
    let first = data[1];

    let (len, length_octets) = if first <= 0x7f {
        (first as usize, 1)
    } else {
        let count = (first & 0x7f) as usize;
        if count > MAX_LENGTH_OCTETS {
            return Err(Error::TooLarge);
        }
        if count + 2 > data.len() {
            return Err(Error::Corrupt);
        }
        let mut len = 0usize;
        for &byte in &data[2..2 + count] {
            len = len << 8 | byte as usize;
        }
        (len, 1 + count)
    };
    if 1 + length_octets + len > data.len() {
        return Err(Error::UnexpectedEod);
    }
    Ok((len, length_octets))
}

// element_span returns the total size of the element starting at data[0]:
// tag, length field and content.
pub(crate) fn element_span(data: &[u8]) -> Result<usize> {
    let (len, length_octets) = content_length(data)?;
    Ok(1 + length_octets + len)
}

#[cfg(test)]
mod tests {
    use super::*;

    // measure_length runs put_length in sizing mode and returns the count.
    fn measure_length(len: usize) -> usize {
        let mut sink = Sink::Measure(0);
        put_length(&mut sink, len);
        sink.produced()
    }

    // write_length runs put_length in write mode and returns the bytes.
    fn write_length(len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; measure_length(len)];
        let mut sink = Sink::Write {
            buf: &mut buf,
            pos: 0,
        };
        put_length(&mut sink, len);
        buf
    }

    // Tests that lengths encode in shortest form across the short/long form
    // boundary.
    #[test]
    fn test_length_encoding() {
        let cases: [(usize, Vec<u8>); 8] = [
            (0, vec![0x00]),
            (1, vec![0x01]),
            (0x7f, vec![0x7f]),
            (0x80, vec![0x81, 0x80]),
            (0xff, vec![0x81, 0xff]),
            (0x100, vec![0x82, 0x01, 0x00]),
            (0xffff, vec![0x82, 0xff, 0xff]),
            (0x10000, vec![0x83, 0x01, 0x00, 0x00]),
        ];

        for (len, expected) in cases {
            assert_eq!(write_length(len), expected, "encoding failed for {}", len);
        }
    }

    // Tests that length fields decode back to the value and octet count they
    // were encoded from.
    #[test]
    fn test_length_decoding() {
        for len in [0usize, 1, 0x7f, 0x80, 0xff, 0x100, 0xffff, 0x10000] {
            let mut element = vec![TAG_OCTET_STRING];
            element.extend_from_slice(&write_length(len));
            let header = element.len();
            element.resize(header + len, 0xaa);

            let (decoded, length_octets) = content_length(&element).unwrap();
            assert_eq!(decoded, len, "decoding failed for {}", len);
            assert_eq!(length_octets, header - 1);
            assert_eq!(element_span(&element).unwrap(), element.len());
        }
    }

    // Tests that malformed length fields fail with the documented errors.
    #[test]
    fn test_length_rejection() {
        // Tag alone, no length octet
        match content_length(&[TAG_OCTET_STRING]).unwrap_err() {
            Error::UnexpectedEod => {}
            other => panic!("Expected UnexpectedEod error, got {:?}", other),
        }

        // More length octets than the implementation supports
        match content_length(&[TAG_OCTET_STRING, 0x85, 1, 1, 1, 1, 1]).unwrap_err() {
            Error::TooLarge => {}
            other => panic!("Expected TooLarge error, got {:?}", other),
        }

        // Long form announcing more octets than the input holds
        match content_length(&[TAG_OCTET_STRING, 0x82, 0x01]).unwrap_err() {
            Error::Corrupt => {}
            other => panic!("Expected Corrupt error, got {:?}", other),
        }

        // Content running past the end of the input
        match content_length(&[TAG_OCTET_STRING, 0x04, 0xaa, 0xbb]).unwrap_err() {
            Error::UnexpectedEod => {}
            other => panic!("Expected UnexpectedEod error, got {:?}", other),
        }
        match content_length(&[TAG_OCTET_STRING, 0x81, 0x80, 0x00]).unwrap_err() {
            Error::UnexpectedEod => {}
            other => panic!("Expected UnexpectedEod error, got {:?}", other),
        }
    }
}
