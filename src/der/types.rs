// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::FileTime;
use std::borrow::Cow;

/// The string type carried by a name value.
///
/// Only NumericString, PrintableString and IA5String are codable; `Any` is
/// rejected outright and the remaining types fail as unsupported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringKind {
    /// No specific type; never valid for encoding.
    Any,
    /// NumericString (digits and space).
    Numeric,
    /// PrintableString (restricted ASCII subset from RFC 5280).
    Printable,
    /// IA5String (7-bit ASCII).
    Ia5,
    /// UTF8String; recognized but not implemented by this codec.
    Utf8,
    /// BMPString; recognized but not implemented by this codec.
    Bmp,
}

/// A DN attribute value: a string type plus the raw value bytes.
///
/// The bytes are carried through without any character-set conversion. A
/// decoder running in no-copy mode borrows them from the input buffer, tying
/// the value's lifetime to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameValue<'a> {
    /// String type of the value.
    pub kind: StringKind,
    /// Raw value bytes, uninterpreted.
    pub data: Cow<'a, [u8]>,
}

impl<'a> NameValue<'a> {
    /// Creates a name value from a string kind and raw bytes.
    pub fn new(kind: StringKind, data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            kind,
            data: data.into(),
        }
    }

    /// Converts any borrowed bytes into owned ones.
    pub fn into_owned(self) -> NameValue<'static> {
        NameValue {
            kind: self.kind,
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}

/// A single RDN attribute: a dotted-decimal type OID and its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RdnAttribute<'a> {
    /// Attribute type OID (for example `2.5.4.3` for CN).
    pub oid: String,
    /// Attribute value.
    pub value: NameValue<'a>,
}

impl RdnAttribute<'_> {
    /// Converts any borrowed bytes into owned ones.
    pub fn into_owned(self) -> RdnAttribute<'static> {
        RdnAttribute {
            oid: self.oid,
            value: self.value.into_owned(),
        }
    }
}

/// A relative distinguished name: one ordering level of a Name.
///
/// Attributes keep their in-memory order here; the encoder emits them as a
/// DER `SET OF`, sorted by their encoded bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rdn<'a> {
    /// Attributes sharing this ordering level.
    pub attributes: Vec<RdnAttribute<'a>>,
}

impl Rdn<'_> {
    /// Converts any borrowed bytes into owned ones.
    pub fn into_owned(self) -> Rdn<'static> {
        Rdn {
            attributes: self
                .attributes
                .into_iter()
                .map(RdnAttribute::into_owned)
                .collect(),
        }
    }
}

/// An X.509 distinguished name: a `SEQUENCE OF` RDN in input order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Name<'a> {
    /// Ordered list of RDNs.
    pub rdns: Vec<Rdn<'a>>,
}

impl Name<'_> {
    /// Converts any borrowed bytes into owned ones.
    pub fn into_owned(self) -> Name<'static> {
        Name {
            rdns: self.rdns.into_iter().map(Rdn::into_owned).collect(),
        }
    }
}

/// A bit string: byte blob plus the count of unused trailing bits.
///
/// `unused_bits` is nominally 0-7 but larger values are tolerated on encode;
/// whole unused bytes are dropped and the remainder becomes the encoded
/// unused-bits octet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitString<'a> {
    /// Bit data, most significant bit first.
    pub data: Cow<'a, [u8]>,
    /// Number of unused bits at the end of the data.
    pub unused_bits: u32,
}

impl BitString<'_> {
    /// Converts any borrowed bytes into owned ones.
    pub fn into_owned(self) -> BitString<'static> {
        BitString {
            data: Cow::Owned(self.data.into_owned()),
            unused_bits: self.unused_bits,
        }
    }
}

/// A multi-byte integer as an uninterpreted little-endian byte blob.
///
/// The same shape backs both the signed (two's-complement) and the unsigned
/// (magnitude) codec; which reading applies is decided by the codec invoked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegerBlob<'a> {
    /// Integer bytes, least significant first.
    pub data: Cow<'a, [u8]>,
}

impl<'a> IntegerBlob<'a> {
    /// Creates an integer blob from little-endian bytes.
    pub fn new(data: impl Into<Cow<'a, [u8]>>) -> Self {
        Self { data: data.into() }
    }

    /// Converts any borrowed bytes into owned ones.
    pub fn into_owned(self) -> IntegerBlob<'static> {
        IntegerBlob {
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}

/// A typed value routed through the object codec dispatcher.
///
/// Each variant pairs with one structure identifier family; handing the
/// dispatcher a variant that does not match the identifier fails with
/// `InvalidParameter`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value<'a> {
    /// X.509 distinguished name.
    Name(Name<'a>),
    /// Octet string / opaque data blob.
    OctetString(Cow<'a, [u8]>),
    /// Bit string (also backs the key-usage structure).
    BitString(BitString<'a>),
    /// Platform-width signed integer.
    Int(i32),
    /// Multi-byte signed integer.
    Integer(IntegerBlob<'a>),
    /// Multi-byte unsigned integer.
    Uinteger(IntegerBlob<'a>),
    /// Enumerated value.
    Enumerated(u32),
    /// Absolute time.
    Time(FileTime),
}

impl Value<'_> {
    /// Converts any borrowed bytes into owned ones.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Name(v) => Value::Name(v.into_owned()),
            Value::OctetString(v) => Value::OctetString(Cow::Owned(v.into_owned())),
            Value::BitString(v) => Value::BitString(v.into_owned()),
            Value::Int(v) => Value::Int(v),
            Value::Integer(v) => Value::Integer(v.into_owned()),
            Value::Uinteger(v) => Value::Uinteger(v.into_owned()),
            Value::Enumerated(v) => Value::Enumerated(v),
            Value::Time(v) => Value::Time(v),
        }
    }
}

/// Flags steering the decoders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeFlags {
    /// Let byte-blob outputs alias the input buffer instead of copying. The
    /// decoded value then borrows from the input and cannot outlive it.
    pub no_copy: bool,
    /// Permit sharing decoded OID strings. Accepted for compatibility; OID
    /// strings are rebuilt from the wire form, so there is nothing to share
    /// and the flag has no effect.
    pub share_oid: bool,
}
