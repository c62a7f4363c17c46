// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Result type used by the DER codec APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Error is the failures that can occur while encoding or decoding DER data,
/// or while dispatching to a codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A required input was missing or malformed at the API boundary.
    #[error("invalid parameter")]
    InvalidParameter,
    /// The caller's output buffer is too small; `needed` is the required size.
    #[error("output buffer too small: {needed} bytes needed")]
    MoreData { needed: usize },
    /// The element does not start with the tag the decoder expects.
    #[error("unexpected tag {found:#04x}")]
    BadTag { found: u8 },
    /// The input ended before the element did.
    #[error("unexpected end of data")]
    UnexpectedEod,
    /// The encoding is illegal for the type being decoded.
    #[error("corrupt encoding")]
    Corrupt,
    /// A length field needs more octets than the implementation supports.
    #[error("length exceeds implementation limit")]
    TooLarge,
    /// The decoder reached an inconsistent internal state.
    #[error("internal decoder inconsistency")]
    Internal,
    /// An object identifier string could not be parsed.
    #[error("invalid object identifier string")]
    InvalidOid,
    /// The value cannot be represented in the requested encoding.
    #[error("value cannot be encoded")]
    BadEncode,
    /// The string type is not one the codec implements.
    #[error("unsupported string type")]
    UnsupportedStringType,
    /// No built-in codec or registered provider handles the structure.
    #[error("no codec for the structure identifier")]
    NotFound,
}
