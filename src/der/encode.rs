// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! DER encoders for the supported structures.
//!
//! Every public encoder follows the same output protocol: pass `None` to get
//! the required size back (sizing pass), pass a buffer to have the element
//! written into its front and the written size returned. A too-small buffer
//! fails with `MoreData` carrying the required size. The underlying encoding
//! logic exists once and runs against either a counting or a writing sink.

use super::{
    BitString, Error, FileTime, IntegerBlob, Name, NameValue, Rdn, RdnAttribute, Result, Sink,
    StringKind, put_length,
};
use super::{
    TAG_BIT_STRING, TAG_ENUMERATED, TAG_IA5_STRING, TAG_INTEGER, TAG_NUMERIC_STRING,
    TAG_OBJECT_ID, TAG_OCTET_STRING, TAG_PRINTABLE_STRING, TAG_SEQUENCE, TAG_SET_OF,
    TAG_UTC_TIME,
};
use chrono::{Datelike, Timelike};

/// Encodes a dotted-decimal object identifier.
pub fn oid(value: &str, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_oid(sink, value))
}

/// Encodes a name value as its tagged string type.
pub fn name_value(value: &NameValue<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_name_value(sink, value))
}

/// Encodes an RDN attribute as a `SEQUENCE` of OID and value.
pub fn rdn_attribute(value: &RdnAttribute<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_rdn_attribute(sink, value))
}

/// Encodes an RDN as a `SET OF` its attributes, sorted as DER requires.
pub fn rdn(value: &Rdn<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_rdn(sink, value))
}

/// Encodes a distinguished name as a `SEQUENCE OF` its RDNs.
pub fn name(value: &Name<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_name(sink, value))
}

/// Encodes a byte blob as an octet string.
pub fn octets(value: &[u8], out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_octets(sink, value))
}

/// Encodes a bit string.
pub fn bits(value: &BitString<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_bits(sink, value))
}

/// Encodes a platform-width signed integer in minimal two's complement.
pub fn int(value: i32, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_int(sink, value))
}

/// Encodes a little-endian signed integer blob.
pub fn integer(value: &IntegerBlob<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| {
        put_trimmed_integer(sink, TAG_INTEGER, &value.data, true)
    })
}

/// Encodes a little-endian unsigned integer blob.
pub fn uinteger(value: &IntegerBlob<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| {
        put_trimmed_integer(sink, TAG_INTEGER, &value.data, false)
    })
}

/// Encodes an enumerated value: the unsigned integer coding under the
/// ENUMERATED tag.
pub fn enumerated(value: u32, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| {
        put_trimmed_integer(sink, TAG_ENUMERATED, &value.to_le_bytes(), false)
    })
}

/// Encodes a UTCTime; fails with `BadEncode` outside the two-digit-year
/// window [1950, 2050].
pub fn utc_time(value: FileTime, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_utc_time(sink, value))
}

/// Encodes a GeneralizedTime.
pub fn generalized_time(value: FileTime, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_generalized_time(sink, value))
}

/// Encodes a time as UTCTime when the year allows it, GeneralizedTime
/// otherwise.
pub fn choice_of_time(value: FileTime, out: Option<&mut [u8]>) -> Result<usize> {
    run(out, |sink| put_choice_of_time(sink, value))
}

// run drives one encoder through the output protocol: a sizing pass first,
// then the write pass if a large enough buffer was supplied.
fn run(out: Option<&mut [u8]>, f: impl Fn(&mut Sink<'_>) -> Result<()>) -> Result<usize> {
    let needed = measure(&f)?;
    let Some(buf) = out else {
        return Ok(needed);
    };
    if buf.len() < needed {
        return Err(Error::MoreData { needed });
    }
    let mut sink = Sink::Write {
        buf: &mut buf[..needed],
        pos: 0,
    };
    f(&mut sink)?;
    Ok(needed)
}

// measure runs an encoder against a counting sink and returns the size it
// would produce.
fn measure(f: impl Fn(&mut Sink<'_>) -> Result<()>) -> Result<usize> {
    let mut sink = Sink::Measure(0);
    f(&mut sink)?;
    Ok(sink.produced())
}

// write_to_vec runs an encoder into a freshly allocated buffer.
fn write_to_vec(f: impl Fn(&mut Sink<'_>) -> Result<()>) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; measure(&f)?];
    let mut sink = Sink::Write {
        buf: &mut buf,
        pos: 0,
    };
    f(&mut sink)?;
    Ok(buf)
}

// base128_size returns the number of base-128 octets a subidentifier needs.
fn base128_size(value: u32) -> usize {
    if value >= 0x1000_0000 {
        5
    } else if value >= 0x20_0000 {
        4
    } else if value >= 0x4000 {
        3
    } else if value >= 0x80 {
        2
    } else {
        1
    }
}

// put_base128 emits a subidentifier in base 128, most significant septet
// first, high bit set on all but the final octet.
fn put_base128(sink: &mut Sink<'_>, value: u32) {
    let count = base128_size(value);
    let mut octets = [0u8; 5];
    let mut rest = value;
    for i in (0..count).rev() {
        octets[i] = (rest & 0x7f) as u8;
        rest >>= 7;
    }
    for &octet in &octets[..count - 1] {
        sink.put_byte(octet | 0x80);
    }
    sink.put_byte(octets[count - 1]);
}

fn put_oid(sink: &mut Sink<'_>, value: &str) -> Result<()> {
    let mut components = Vec::new();
    for part in value.split('.') {
        components.push(part.parse::<u32>().map_err(|_| Error::InvalidOid)?);
    }
    if components.len() < 2 {
        return Err(Error::InvalidOid);
    }
    let mut content = 1;
    for &component in &components[2..] {
        content += base128_size(component);
    }
    sink.put_byte(TAG_OBJECT_ID);
    put_length(sink, content);
    // The first two components collapse into one octet; well-formed input
    // (c1 <= 2, c2 < 40 below joint-iso) is assumed, not enforced.
    sink.put_byte(components[0].wrapping_mul(40).wrapping_add(components[1]) as u8);
    for &component in &components[2..] {
        put_base128(sink, component);
    }
    Ok(())
}

fn put_name_value(sink: &mut Sink<'_>, value: &NameValue<'_>) -> Result<()> {
    let tag = match value.kind {
        StringKind::Numeric => TAG_NUMERIC_STRING,
        StringKind::Printable => TAG_PRINTABLE_STRING,
        StringKind::Ia5 => TAG_IA5_STRING,
        // Explicitly disallowed: the caller has to commit to a string type
        StringKind::Any => return Err(Error::InvalidParameter),
        StringKind::Utf8 | StringKind::Bmp => return Err(Error::UnsupportedStringType),
    };
    sink.put_byte(tag);
    put_length(sink, value.data.len());
    sink.put(&value.data);
    Ok(())
}

fn put_rdn_attribute(sink: &mut Sink<'_>, value: &RdnAttribute<'_>) -> Result<()> {
    let content = measure(|sink| {
        put_oid(sink, &value.oid)?;
        put_name_value(sink, &value.value)
    })?;
    sink.put_byte(TAG_SEQUENCE);
    put_length(sink, content);
    put_oid(sink, &value.oid)?;
    put_name_value(sink, &value.value)
}

// put_rdn encodes a SET OF, which in DER must be sorted by the encoded
// attribute bytes (shorter run first on a common prefix). Each attribute is
// encoded into its own transient buffer so the sort can compare wire bytes.
fn put_rdn(sink: &mut Sink<'_>, value: &Rdn<'_>) -> Result<()> {
    let mut encoded = Vec::with_capacity(value.attributes.len());
    for attribute in &value.attributes {
        encoded.push(write_to_vec(|sink| put_rdn_attribute(sink, attribute))?);
    }
    encoded.sort();

    let content = encoded.iter().map(Vec::len).sum();
    sink.put_byte(TAG_SET_OF);
    put_length(sink, content);
    for attribute in &encoded {
        sink.put(attribute);
    }
    Ok(())
}

fn put_name(sink: &mut Sink<'_>, value: &Name<'_>) -> Result<()> {
    let content = measure(|sink| {
        for rdn in &value.rdns {
            put_rdn(sink, rdn)?;
        }
        Ok(())
    })?;
    sink.put_byte(TAG_SEQUENCE);
    put_length(sink, content);
    for rdn in &value.rdns {
        put_rdn(sink, rdn)?;
    }
    Ok(())
}

fn put_octets(sink: &mut Sink<'_>, value: &[u8]) -> Result<()> {
    sink.put_byte(TAG_OCTET_STRING);
    put_length(sink, value.len());
    sink.put(value);
    Ok(())
}

fn put_bits(sink: &mut Sink<'_>, value: &BitString<'_>) -> Result<()> {
    let total_bits = value.data.len() * 8;
    // unused_bits >= 8 is tolerated: whole unused bytes are dropped and only
    // the remainder is carried into the unused-bits octet
    let (data_bytes, unused) = if total_bits > value.unused_bits as usize {
        let bit_len = total_bits - value.unused_bits as usize;
        let data_bytes = bit_len.div_ceil(8);
        (data_bytes, (data_bytes * 8 - bit_len) as u8)
    } else {
        (0, 0)
    };
    sink.put_byte(TAG_BIT_STRING);
    put_length(sink, data_bytes + 1);
    sink.put_byte(unused);
    if data_bytes > 0 {
        sink.put(&value.data[..data_bytes - 1]);
        // trailing unused bits are zeroed, as DER requires
        sink.put_byte(value.data[data_bytes - 1] & (0xff << unused));
    }
    Ok(())
}

fn put_int(sink: &mut Sink<'_>, value: i32) -> Result<()> {
    let bytes = value.to_be_bytes();
    // Drop redundant sign bytes from the front, keeping the sign intact
    let mut start = 0;
    while start < 3
        && ((bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0))
    {
        start += 1;
    }
    sink.put_byte(TAG_INTEGER);
    put_length(sink, 4 - start);
    sink.put(&bytes[start..]);
    Ok(())
}

// put_trimmed_integer emits an integer from a little-endian blob under the
// given tag: redundant high-order sign bytes are trimmed, and one pad byte
// is added back when the retained top byte would flip the sign. A blob that
// is all sign bytes (or empty) is the value 0 or -1 and keeps one octet.
fn put_trimmed_integer(sink: &mut Sink<'_>, tag: u8, data: &[u8], signed: bool) -> Result<()> {
    let mut significant = data.len();
    let negative = signed && significant > 0 && data[significant - 1] & 0x80 != 0;
    let sign_byte: u8 = if negative { 0xff } else { 0x00 };
    while significant > 0 && data[significant - 1] == sign_byte {
        significant -= 1;
    }
    if significant == 0 {
        sink.put_byte(tag);
        put_length(sink, 1);
        sink.put_byte(sign_byte);
        return Ok(());
    }

    let pad = if negative {
        data[significant - 1] < 0x80
    } else {
        data[significant - 1] > 0x7f
    };
    sink.put_byte(tag);
    put_length(sink, significant + pad as usize);
    if pad {
        sink.put_byte(sign_byte);
    }
    for i in (0..significant).rev() {
        sink.put_byte(data[i]);
    }
    Ok(())
}

fn put_utc_time(sink: &mut Sink<'_>, value: FileTime) -> Result<()> {
    let time = value.to_datetime().map_err(|_| Error::BadEncode)?;
    let year = time.year();
    if !(1950..=2050).contains(&year) {
        return Err(Error::BadEncode);
    }
    let content = format!(
        "{:02}{:02}{:02}{:02}{:02}{:02}Z",
        if year >= 2000 { year - 2000 } else { year - 1900 },
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        time.second()
    );
    sink.put_byte(TAG_UTC_TIME);
    put_length(sink, content.len());
    sink.put(content.as_bytes());
    Ok(())
}

fn put_generalized_time(sink: &mut Sink<'_>, value: FileTime) -> Result<()> {
    let time = value.to_datetime().map_err(|_| Error::BadEncode)?;
    if time.year() > 9999 {
        return Err(Error::BadEncode);
    }
    let content = format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}Z",
        time.year(),
        time.month(),
        time.day(),
        time.hour(),
        time.minute(),
        time.second()
    );
    sink.put_byte(super::TAG_GENERALIZED_TIME);
    put_length(sink, content.len());
    sink.put(content.as_bytes());
    Ok(())
}

fn put_choice_of_time(sink: &mut Sink<'_>, value: FileTime) -> Result<()> {
    let time = value.to_datetime().map_err(|_| Error::BadEncode)?;
    if (1950..=2050).contains(&time.year()) {
        put_utc_time(sink, value)
    } else {
        put_generalized_time(sink, value)
    }
}
