// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Object codec dispatch.
//!
//! The entry points here route a structure identifier to its codec: the
//! built-in catalog first, then providers registered for the identifier in
//! the [`ProviderRegistry`]. Encoders follow the sizing/write output
//! protocol of [`crate::der::encode`]; decoders hand back a typed [`Value`].
//! The legacy entry points, which predate the extended ones, consult the
//! registry under their own function names first so providers registered in
//! the legacy shape keep working, and forward to the extended paths
//! otherwise.

mod registry;

pub use registry::{
    ModuleLoader, ProviderModule, ProviderRegistry, RegistryEntry, ResolvedCodec, VALUE_FUNC_NAME,
    VALUE_MODULE,
};

use crate::der::{DecodeFlags, Error, Result, Value, decode, encode};
use std::fmt;

/// Certificate encoding type for X.509 ASN.1 DER.
pub const X509_ASN_ENCODING: u32 = 0x0000_0001;
/// Message encoding type for PKCS #7 ASN.1 DER.
pub const PKCS_7_ASN_ENCODING: u32 = 0x0001_0000;
/// Mask selecting the certificate encoding bits of an encoding type.
pub const CERT_ENCODING_TYPE_MASK: u32 = 0x0000_ffff;
/// Mask selecting the message encoding bits of an encoding type.
pub const CMSG_ENCODING_TYPE_MASK: u32 = 0xffff_0000;

// The integer structure identifiers with built-in codecs.
pub const STRUCT_NAME: u16 = 7;
pub const STRUCT_KEY_USAGE: u16 = 14;
pub const STRUCT_UTC_TIME: u16 = 17;
pub const STRUCT_OCTET_STRING: u16 = 25;
pub const STRUCT_BITS: u16 = 26;
pub const STRUCT_INTEGER: u16 = 27;
pub const STRUCT_MULTI_BYTE_INTEGER: u16 = 28;
pub const STRUCT_ENUMERATED: u16 = 29;
pub const STRUCT_CHOICE_OF_TIME: u16 = 30;
pub const STRUCT_MULTI_BYTE_UINT: u16 = 38;

// The textual OIDs with built-in codecs.
pub const OID_RSA_SIGNING_TIME: &str = "1.2.840.113549.1.9.5";
pub const OID_CRL_REASON_CODE: &str = "2.5.29.21";
pub const OID_KEY_USAGE: &str = "2.5.29.15";
pub const OID_SUBJECT_KEY_IDENTIFIER: &str = "2.5.29.14";

// The function names keying provider registrations.
pub const FUNC_ENCODE_OBJECT_EX: &str = "encoder";
pub const FUNC_DECODE_OBJECT_EX: &str = "decoder";
pub const FUNC_ENCODE_OBJECT: &str = "legacy-encoder";
pub const FUNC_DECODE_OBJECT: &str = "legacy-decoder";

/// A structure identifier: one of the small integer tags from the built-in
/// catalog, or a textual OID.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum StructId {
    /// Small integer identifier.
    Tag(u16),
    /// Dotted-decimal OID identifier.
    Oid(String),
}

impl fmt::Display for StructId {
    // Integer identifiers print in their #NNNN registry form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructId::Tag(tag) => write!(f, "#{}", tag),
            StructId::Oid(oid) => f.write_str(oid),
        }
    }
}

/// The interface implemented by externally registered codec providers.
pub trait ObjectCodec {
    /// Encodes the value, following the output protocol of
    /// [`encode_object_ex`].
    fn encode(
        &self,
        encoding_type: u32,
        ident: &StructId,
        value: &Value<'_>,
        out: Option<&mut [u8]>,
    ) -> Result<usize>;

    /// Decodes one element from the front of the data, following the
    /// contract of [`decode_object_ex`].
    fn decode<'a>(
        &self,
        encoding_type: u32,
        ident: &StructId,
        data: &'a [u8],
        flags: DecodeFlags,
    ) -> Result<Value<'a>>;
}

/// Encodes a typed value for the identified structure.
///
/// Passing `None` for `out` reports the required size; a too-small buffer
/// fails with `MoreData`. Identifiers without a built-in codec fall back to
/// providers registered under [`FUNC_ENCODE_OBJECT_EX`]; with no provider
/// either, the call fails with `NotFound`.
pub fn encode_object_ex(
    registry: &ProviderRegistry,
    encoding_type: u32,
    ident: &StructId,
    value: &Value<'_>,
    out: Option<&mut [u8]>,
) -> Result<usize> {
    check_encoding_type(encoding_type)?;
    match builtin(ident) {
        Some(codec) => encode_builtin(codec, value, out),
        None => {
            tracing::debug!(encoding_type, ident = %ident, "no built-in encoder, trying providers");
            match registry.resolve(encoding_type, FUNC_ENCODE_OBJECT_EX, ident) {
                Some(resolved) => resolved.codec.encode(encoding_type, ident, value, out),
                None => Err(Error::NotFound),
            }
        }
    }
}

/// Encodes a typed value into a freshly allocated buffer whose ownership
/// transfers to the caller.
pub fn encode_object_ex_to_vec(
    registry: &ProviderRegistry,
    encoding_type: u32,
    ident: &StructId,
    value: &Value<'_>,
) -> Result<Vec<u8>> {
    let needed = encode_object_ex(registry, encoding_type, ident, value, None)?;
    let mut buf = vec![0u8; needed];
    encode_object_ex(registry, encoding_type, ident, value, Some(&mut buf))?;
    Ok(buf)
}

/// Decodes the identified structure from the front of the data into its
/// typed value, ignoring anything after the element.
///
/// Identifiers without a built-in codec fall back to providers registered
/// under [`FUNC_DECODE_OBJECT_EX`]; with no provider either, the call fails
/// with `NotFound`.
pub fn decode_object_ex<'a>(
    registry: &ProviderRegistry,
    encoding_type: u32,
    ident: &StructId,
    data: &'a [u8],
    flags: DecodeFlags,
) -> Result<Value<'a>> {
    check_encoding_type(encoding_type)?;
    match builtin(ident) {
        Some(codec) => decode_builtin(codec, data, flags),
        None => {
            tracing::debug!(encoding_type, ident = %ident, "no built-in decoder, trying providers");
            match registry.resolve(encoding_type, FUNC_DECODE_OBJECT_EX, ident) {
                Some(resolved) => resolved.codec.decode(encoding_type, ident, data, flags),
                None => Err(Error::NotFound),
            }
        }
    }
}

/// Legacy encode entry point: providers registered in the legacy shape are
/// consulted first, everything else forwards to [`encode_object_ex`].
pub fn encode_object(
    registry: &ProviderRegistry,
    encoding_type: u32,
    ident: &StructId,
    value: &Value<'_>,
    out: Option<&mut [u8]>,
) -> Result<usize> {
    if let Some(resolved) = registry.resolve(encoding_type, FUNC_ENCODE_OBJECT, ident) {
        return resolved.codec.encode(encoding_type, ident, value, out);
    }
    encode_object_ex(registry, encoding_type, ident, value, out)
}

/// Legacy decode entry point: providers registered in the legacy shape are
/// consulted first, everything else forwards to [`decode_object_ex`].
pub fn decode_object<'a>(
    registry: &ProviderRegistry,
    encoding_type: u32,
    ident: &StructId,
    data: &'a [u8],
    flags: DecodeFlags,
) -> Result<Value<'a>> {
    if let Some(resolved) = registry.resolve(encoding_type, FUNC_DECODE_OBJECT, ident) {
        return resolved.codec.decode(encoding_type, ident, data, flags);
    }
    decode_object_ex(registry, encoding_type, ident, data, flags)
}

// check_encoding_type requires at least one of the known certificate or
// message encodings to be selected.
fn check_encoding_type(encoding_type: u32) -> Result<()> {
    if encoding_type & CERT_ENCODING_TYPE_MASK != X509_ASN_ENCODING
        && encoding_type & CMSG_ENCODING_TYPE_MASK != PKCS_7_ASN_ENCODING
    {
        return Err(Error::NotFound);
    }
    Ok(())
}

// The built-in codec routines, selected by structure identifier.
#[derive(Clone, Copy, Debug)]
enum Builtin {
    Name,
    Octets,
    Bits,
    Int,
    Integer,
    Uinteger,
    Enumerated,
    ChoiceOfTime,
    UtcTime,
}

// builtin maps a structure identifier to its built-in codec, if any.
fn builtin(ident: &StructId) -> Option<Builtin> {
    match ident {
        StructId::Tag(tag) => match *tag {
            STRUCT_NAME => Some(Builtin::Name),
            STRUCT_OCTET_STRING => Some(Builtin::Octets),
            STRUCT_BITS | STRUCT_KEY_USAGE => Some(Builtin::Bits),
            STRUCT_INTEGER => Some(Builtin::Int),
            STRUCT_MULTI_BYTE_INTEGER => Some(Builtin::Integer),
            STRUCT_MULTI_BYTE_UINT => Some(Builtin::Uinteger),
            STRUCT_ENUMERATED => Some(Builtin::Enumerated),
            STRUCT_CHOICE_OF_TIME => Some(Builtin::ChoiceOfTime),
            STRUCT_UTC_TIME => Some(Builtin::UtcTime),
            _ => None,
        },
        StructId::Oid(oid) => match oid.as_str() {
            OID_RSA_SIGNING_TIME => Some(Builtin::UtcTime),
            OID_CRL_REASON_CODE => Some(Builtin::Enumerated),
            OID_KEY_USAGE => Some(Builtin::Bits),
            OID_SUBJECT_KEY_IDENTIFIER => Some(Builtin::Octets),
            _ => None,
        },
    }
}

// encode_builtin runs a built-in encoder; a value whose shape does not fit
// the identifier's codec is an invalid parameter.
fn encode_builtin(codec: Builtin, value: &Value<'_>, out: Option<&mut [u8]>) -> Result<usize> {
    match (codec, value) {
        (Builtin::Name, Value::Name(v)) => encode::name(v, out),
        (Builtin::Octets, Value::OctetString(v)) => encode::octets(v, out),
        (Builtin::Bits, Value::BitString(v)) => encode::bits(v, out),
        (Builtin::Int, Value::Int(v)) => encode::int(*v, out),
        (Builtin::Integer, Value::Integer(v)) => encode::integer(v, out),
        (Builtin::Uinteger, Value::Uinteger(v)) => encode::uinteger(v, out),
        (Builtin::Enumerated, Value::Enumerated(v)) => encode::enumerated(*v, out),
        (Builtin::ChoiceOfTime, Value::Time(v)) => encode::choice_of_time(*v, out),
        (Builtin::UtcTime, Value::Time(v)) => encode::utc_time(*v, out),
        _ => Err(Error::InvalidParameter),
    }
}

// decode_builtin runs a built-in decoder, wrapping the result in its Value
// shape.
fn decode_builtin<'a>(codec: Builtin, data: &'a [u8], flags: DecodeFlags) -> Result<Value<'a>> {
    match codec {
        Builtin::Name => decode::name(data, flags).map(Value::Name),
        Builtin::Octets => decode::octets(data, flags).map(Value::OctetString),
        Builtin::Bits => decode::bits(data, flags).map(Value::BitString),
        Builtin::Int => decode::int(data).map(Value::Int),
        Builtin::Integer => decode::integer(data).map(Value::Integer),
        Builtin::Uinteger => decode::uinteger(data).map(Value::Uinteger),
        Builtin::Enumerated => decode::enumerated(data).map(Value::Enumerated),
        Builtin::ChoiceOfTime => decode::choice_of_time(data).map(Value::Time),
        Builtin::UtcTime => decode::utc_time(data).map(Value::Time),
    }
}
