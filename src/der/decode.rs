// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! DER decoders for the supported structures.
//!
//! Every decoder reads exactly one element from the front of its input and
//! ignores anything after it, so elements embedded in larger messages can be
//! decoded in place. Byte-blob outputs are `Cow`s: with
//! [`DecodeFlags::no_copy`] set they borrow from the input buffer instead of
//! copying, tying their lifetime to it.

use super::{
    BitString, DecodeFlags, Error, FileTime, IntegerBlob, Name, NameValue, Rdn, RdnAttribute,
    Result, StringKind, content_length, element_span,
};
use super::{
    TAG_BIT_STRING, TAG_ENUMERATED, TAG_GENERALIZED_TIME, TAG_IA5_STRING, TAG_INTEGER,
    TAG_NUMERIC_STRING, TAG_OBJECT_ID, TAG_OCTET_STRING, TAG_PRINTABLE_STRING, TAG_SEQUENCE,
    TAG_SET_OF, TAG_UTC_TIME,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::borrow::Cow;

// The time grammars need at least ten content octets before the optional
// trailing fields start.
const MIN_TIME_LENGTH: usize = 10;

/// Decodes an object identifier into its dotted-decimal text form.
pub fn oid(data: &[u8]) -> Result<String> {
    let content = tagged_content(data, TAG_OBJECT_ID)?;
    let Some((&first, mut rest)) = content.split_first() else {
        return Ok(String::new());
    };
    let mut text = format!("{}.{}", first / 40, first % 40);
    while !rest.is_empty() {
        let mut value: u32 = 0;
        while let [byte, tail @ ..] = rest
            && byte & 0x80 != 0
        {
            value = value << 7 | (byte & 0x7f) as u32;
            rest = tail;
        }
        let [byte, tail @ ..] = rest else {
            // the subidentifier ran off the end with its high bit still set
            return Err(Error::Corrupt);
        };
        value = value << 7 | *byte as u32;
        rest = tail;
        text.push('.');
        text.push_str(&value.to_string());
    }
    Ok(text)
}

/// Decodes a tagged string into a name value; the bytes are carried through
/// without character-set conversion.
pub fn name_value<'a>(data: &'a [u8], flags: DecodeFlags) -> Result<NameValue<'a>> {
    let (len, length_octets) = content_length(data)?;
    let kind = match data[0] {
        TAG_NUMERIC_STRING => StringKind::Numeric,
        TAG_PRINTABLE_STRING => StringKind::Printable,
        TAG_IA5_STRING => StringKind::Ia5,
        _ => return Err(Error::UnsupportedStringType),
    };
    let content = &data[1 + length_octets..1 + length_octets + len];
    Ok(NameValue {
        kind,
        data: borrow_or_copy(content, flags),
    })
}

/// Decodes an RDN attribute: a `SEQUENCE` of type OID and value.
pub fn rdn_attribute<'a>(data: &'a [u8], flags: DecodeFlags) -> Result<RdnAttribute<'a>> {
    let (len, length_octets) = content_length(data)?;
    // Two nested TLVs with short lengths need at least four octets
    if len < 4 {
        return Err(Error::UnexpectedEod);
    }
    if data[0] != TAG_SEQUENCE {
        return Err(Error::BadTag { found: data[0] });
    }
    let content = &data[1 + length_octets..1 + length_octets + len];
    let oid_span = element_span(content)?;
    let attr_oid = oid(&content[..oid_span])?;
    let value = name_value(&content[oid_span..], flags)?;
    Ok(RdnAttribute {
        oid: attr_oid,
        value,
    })
}

/// Decodes an RDN: a `SET OF` attributes.
pub fn rdn<'a>(data: &'a [u8], flags: DecodeFlags) -> Result<Rdn<'a>> {
    let (len, length_octets) = content_length(data)?;
    if data[0] != TAG_SET_OF {
        return Err(Error::BadTag { found: data[0] });
    }
    let mut content = &data[1 + length_octets..1 + length_octets + len];
    let mut attributes = Vec::new();
    while !content.is_empty() {
        let span = element_span(content)?;
        attributes.push(rdn_attribute(&content[..span], flags)?);
        content = &content[span..];
    }
    Ok(Rdn { attributes })
}

/// Decodes a distinguished name: a `SEQUENCE OF` RDN.
pub fn name<'a>(data: &'a [u8], flags: DecodeFlags) -> Result<Name<'a>> {
    let (len, length_octets) = content_length(data)?;
    if data[0] != TAG_SEQUENCE {
        return Err(Error::BadTag { found: data[0] });
    }
    let mut content = &data[1 + length_octets..1 + length_octets + len];
    let mut rdns = Vec::new();
    while !content.is_empty() {
        let span = element_span(content)?;
        rdns.push(rdn(&content[..span], flags)?);
        content = &content[span..];
    }
    Ok(Name { rdns })
}

/// Decodes an octet string into its byte blob.
pub fn octets<'a>(data: &'a [u8], flags: DecodeFlags) -> Result<Cow<'a, [u8]>> {
    Ok(borrow_or_copy(
        tagged_content(data, TAG_OCTET_STRING)?,
        flags,
    ))
}

/// Decodes a bit string.
///
/// When copying, the trailing unused bits of the last byte are zeroed; in
/// no-copy mode the bytes alias the input and stay exactly as transmitted.
pub fn bits<'a>(data: &'a [u8], flags: DecodeFlags) -> Result<BitString<'a>> {
    let content = tagged_content(data, TAG_BIT_STRING)?;
    // The unused-bits octet is mandatory, even for an empty bit string
    let Some((&unused_bits, bytes)) = content.split_first() else {
        return Err(Error::Corrupt);
    };
    let unused_bits = unused_bits as u32;
    let data = if flags.no_copy {
        Cow::Borrowed(bytes)
    } else {
        let mut copy = bytes.to_vec();
        if let Some(last) = copy.last_mut() {
            *last &= unused_mask(unused_bits);
        }
        Cow::Owned(copy)
    };
    Ok(BitString { data, unused_bits })
}

/// Decodes a platform-width signed integer, sign-extending from the top
/// content bit. Encodings longer than the platform width fail as too large.
pub fn int(data: &[u8]) -> Result<i32> {
    if data.is_empty() {
        return Err(Error::UnexpectedEod);
    }
    if data[0] != TAG_INTEGER {
        return Err(Error::BadTag { found: data[0] });
    }
    if data.len() <= 1 {
        return Err(Error::UnexpectedEod);
    }
    // A length that fits the platform width is always short form, so the
    // octet is the content length; anything larger is rejected either way
    let len = data[1] as usize;
    if len == 0 {
        return Err(Error::Corrupt);
    }
    if len > size_of::<i32>() {
        return Err(Error::TooLarge);
    }
    if 2 + len > data.len() {
        return Err(Error::UnexpectedEod);
    }
    let mut value: i32 = if data[2] & 0x80 != 0 { -1 } else { 0 };
    for &byte in &data[2..2 + len] {
        value = value << 8 | byte as i32;
    }
    Ok(value)
}

/// Decodes a multi-byte signed integer into its little-endian blob form.
pub fn integer(data: &[u8]) -> Result<IntegerBlob<'static>> {
    let content = tagged_content(data, TAG_INTEGER)?;
    let mut bytes = content.to_vec();
    bytes.reverse();
    Ok(IntegerBlob::new(bytes))
}

/// Decodes a multi-byte unsigned integer into its little-endian blob form,
/// dropping the leading zero sign byte if one is present.
pub fn uinteger(data: &[u8]) -> Result<IntegerBlob<'static>> {
    let mut content = tagged_content(data, TAG_INTEGER)?;
    if let [0x00, rest @ ..] = content {
        content = rest;
    }
    let mut bytes = content.to_vec();
    bytes.reverse();
    Ok(IntegerBlob::new(bytes))
}

/// Decodes an enumerated value as unsigned.
///
/// One octet beyond the value width is accepted, since large values carry a
/// leading zero sign byte (0xffffffff arrives as `0a 05 00 ff ff ff ff`).
pub fn enumerated(data: &[u8]) -> Result<u32> {
    if data.is_empty() {
        return Err(Error::UnexpectedEod);
    }
    if data[0] != TAG_ENUMERATED {
        return Err(Error::BadTag { found: data[0] });
    }
    if data.len() <= 1 {
        return Err(Error::UnexpectedEod);
    }
    let len = data[1] as usize;
    if len == 0 {
        return Err(Error::Corrupt);
    }
    if len > size_of::<u32>() + 1 {
        return Err(Error::TooLarge);
    }
    if 2 + len > data.len() {
        return Err(Error::UnexpectedEod);
    }
    let mut value: u64 = 0;
    for &byte in &data[2..2 + len] {
        value = value << 8 | byte as u64;
    }
    Ok(value as u32)
}

/// Decodes a UTCTime: `YYMMDDHHMMSS` with optional seconds and time zone.
/// Two-digit years 50 and up are 19xx, the rest 20xx.
pub fn utc_time(data: &[u8]) -> Result<FileTime> {
    let content = time_content(data, TAG_UTC_TIME)?;
    let mut cursor = content;
    let mut year = get_digits(&mut cursor, 2)? as i32;
    year += if year >= 50 { 1900 } else { 2000 };
    let month = get_digits(&mut cursor, 2)?;
    let day = get_digits(&mut cursor, 2)?;
    let hour = get_digits(&mut cursor, 2)?;
    let minute = get_digits(&mut cursor, 2)?;
    let mut second = 0;
    if !cursor.is_empty() {
        // seconds are optional and may be a single digit
        if cursor.len() >= 2 && cursor[0].is_ascii_digit() && cursor[1].is_ascii_digit() {
            second = get_digits(&mut cursor, 2)?;
        } else if cursor[0].is_ascii_digit() {
            second = get_digits(&mut cursor, 1)?;
        }
    }
    let offset = time_zone(cursor)?;
    civil_to_file_time(year, month, day, hour, minute, second, 0, offset)
}

/// Decodes a GeneralizedTime: `YYYYMMDDHH` with optional minutes, seconds,
/// fractional seconds and time zone.
pub fn generalized_time(data: &[u8]) -> Result<FileTime> {
    let content = time_content(data, TAG_GENERALIZED_TIME)?;
    let mut cursor = content;
    let year = get_digits(&mut cursor, 4)? as i32;
    let month = get_digits(&mut cursor, 2)?;
    let day = get_digits(&mut cursor, 2)?;
    let hour = get_digits(&mut cursor, 2)?;
    let mut minute = 0;
    let mut second = 0;
    let mut milli = 0;
    if !cursor.is_empty() {
        minute = get_digits(&mut cursor, 2)?;
        if !cursor.is_empty() {
            second = get_digits(&mut cursor, 2)?;
        }
        if !cursor.is_empty() && (cursor[0] == b'.' || cursor[0] == b',') {
            cursor = &cursor[1..];
            let digits = cursor.len().min(3);
            milli = get_digits(&mut cursor, digits)?;
        }
    }
    let offset = time_zone(cursor)?;
    civil_to_file_time(year, month, day, hour, minute, second, milli, offset)
}

/// Decodes either time form, picked by the leading tag.
pub fn choice_of_time(data: &[u8]) -> Result<FileTime> {
    if data.is_empty() {
        return Err(Error::UnexpectedEod);
    }
    match data[0] {
        TAG_UTC_TIME => utc_time(data),
        TAG_GENERALIZED_TIME => generalized_time(data),
        found => Err(Error::BadTag { found }),
    }
}

// tagged_content parses the element header and returns the content slice,
// verifying the expected tag.
fn tagged_content(data: &[u8], tag: u8) -> Result<&[u8]> {
    let (len, length_octets) = content_length(data)?;
    if data[0] != tag {
        return Err(Error::BadTag { found: data[0] });
    }
    Ok(&data[1 + length_octets..1 + length_octets + len])
}

// borrow_or_copy aliases the content in no-copy mode and copies it otherwise.
fn borrow_or_copy<'a>(content: &'a [u8], flags: DecodeFlags) -> Cow<'a, [u8]> {
    if flags.no_copy {
        Cow::Borrowed(content)
    } else {
        Cow::Owned(content.to_vec())
    }
}

// unused_mask builds the mask zeroing the unused trailing bits of the last
// bit-string byte; eight or more unused bits blank it entirely.
fn unused_mask(unused_bits: u32) -> u8 {
    if unused_bits >= 8 { 0 } else { 0xff << unused_bits }
}

// time_content returns the content of a time element. Time strings are
// always short: a long-form length cannot be valid and fails as corrupt.
fn time_content(data: &[u8], tag: u8) -> Result<&[u8]> {
    if data.is_empty() {
        return Err(Error::UnexpectedEod);
    }
    if data[0] != tag {
        return Err(Error::BadTag { found: data[0] });
    }
    if data.len() <= 1 {
        return Err(Error::UnexpectedEod);
    }
    if data[1] > 0x7f {
        return Err(Error::Corrupt);
    }
    let len = data[1] as usize;
    if len < MIN_TIME_LENGTH {
        return Err(Error::Corrupt);
    }
    if 2 + len > data.len() {
        return Err(Error::UnexpectedEod);
    }
    Ok(&data[2..2 + len])
}

// get_digits consumes up to `count` ASCII digits from the front of the
// cursor and returns their value. Running out of input is not an error, as
// the time grammars make trailing fields optional; a non-digit inside the
// window is corrupt.
fn get_digits(cursor: &mut &[u8], count: usize) -> Result<u32> {
    let mut value = 0u32;
    let mut taken = 0;
    while let [byte, rest @ ..] = *cursor
        && taken < count
    {
        if !byte.is_ascii_digit() {
            return Err(Error::Corrupt);
        }
        value = value * 10 + (byte - b'0') as u32;
        *cursor = rest;
        taken += 1;
    }
    Ok(value)
}

// time_zone parses an optional trailing +HHMM / +HH / -HHMM / -HH offset,
// returning the signed offset in minutes. Anything else, a 'Z' suffix
// included, leaves the time as is.
fn time_zone(mut cursor: &[u8]) -> Result<i64> {
    if cursor.len() < 3 || (cursor[0] != b'+' && cursor[0] != b'-') {
        return Ok(0);
    }
    let negative = cursor[0] == b'-';
    cursor = &cursor[1..];
    let hours = get_digits(&mut cursor, 2)?;
    if hours >= 24 {
        return Err(Error::Corrupt);
    }
    let minutes = if cursor.len() >= 2 {
        get_digits(&mut cursor, 2)?
    } else {
        0
    };
    if minutes >= 60 {
        return Err(Error::Corrupt);
    }
    let offset = (hours * 60 + minutes) as i64;
    Ok(if negative { -offset } else { offset })
}

// civil_to_file_time folds decoded civil fields and a time-zone offset into
// an instant. The broken-down time becomes an absolute instant first and the
// signed offset applies to that, so an offset can never underflow a field.
fn civil_to_file_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
    offset_minutes: i64,
) -> Result<FileTime> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or(Error::Corrupt)?;
    let time = date
        .and_hms_milli_opt(hour, minute, second, milli)
        .ok_or(Error::Corrupt)?;
    let instant = Utc.from_utc_datetime(&time) + Duration::minutes(offset_minutes);
    FileTime::from_datetime(instant)
}
