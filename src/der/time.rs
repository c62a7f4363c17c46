// asn1-rs: ASN.1 DER encoding and decoding
// Copyright 2026 Dark Bio AG. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};

// Interval bookkeeping for the 100 ns tick.
const INTERVALS_PER_SECOND: u64 = 10_000_000;
const INTERVALS_PER_MILLISECOND: u64 = 10_000;

// Seconds between the certificate epoch (1601-01-01) and the UNIX epoch.
const UNIX_EPOCH_DELTA_SECONDS: i64 = 11_644_473_600;

/// An absolute instant counted in 100 ns intervals since the certificate
/// epoch, 1601-01-01T00:00:00Z.
///
/// This is the in-memory form all time codecs operate on; the UTCTime and
/// GeneralizedTime wire forms are derived from it on demand. Sub-millisecond
/// precision survives storage but not a codec round-trip, since the wire
/// forms carry at most milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileTime {
    /// Number of 100 ns intervals since 1601-01-01T00:00:00Z.
    pub intervals: u64,
}

impl FileTime {
    /// Creates an instant from a UNIX timestamp in seconds.
    pub fn from_unix(secs: u64) -> Self {
        Self {
            intervals: (secs + UNIX_EPOCH_DELTA_SECONDS as u64) * INTERVALS_PER_SECOND,
        }
    }

    // from_datetime converts a civil UTC time into an instant. Times before
    // the certificate epoch are not representable.
    pub(crate) fn from_datetime(time: DateTime<Utc>) -> Result<Self> {
        let secs = time.timestamp() + UNIX_EPOCH_DELTA_SECONDS;
        if secs < 0 {
            return Err(Error::Corrupt);
        }
        let millis = time.timestamp_subsec_millis() as u64;
        Ok(Self {
            intervals: secs as u64 * INTERVALS_PER_SECOND + millis * INTERVALS_PER_MILLISECOND,
        })
    }

    // to_datetime converts the instant back into a civil UTC time, truncated
    // to millisecond precision.
    pub(crate) fn to_datetime(self) -> Result<DateTime<Utc>> {
        let secs = (self.intervals / INTERVALS_PER_SECOND) as i64 - UNIX_EPOCH_DELTA_SECONDS;
        let millis = self.intervals % INTERVALS_PER_SECOND / INTERVALS_PER_MILLISECOND;
        Utc.timestamp_opt(secs, millis as u32 * 1_000_000)
            .single()
            .ok_or(Error::BadEncode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    // Tests the conversion between instants and civil time on a few known
    // timestamps, including the two epochs.
    #[test]
    fn test_datetime_conversion() {
        // The certificate epoch itself
        let epoch = FileTime { intervals: 0 };
        let time = epoch.to_datetime().unwrap();
        assert_eq!(
            time,
            Utc.with_ymd_and_hms(1601, 1, 1, 0, 0, 0).single().unwrap()
        );
        assert_eq!(FileTime::from_datetime(time).unwrap(), epoch);

        // The UNIX epoch
        let unix = FileTime::from_unix(0);
        assert_eq!(
            unix.to_datetime().unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).single().unwrap()
        );

        // An arbitrary modern timestamp
        let time = Utc.with_ymd_and_hms(2000, 1, 2, 3, 4, 5).single().unwrap();
        let ft = FileTime::from_datetime(time).unwrap();
        assert_eq!(ft, FileTime::from_unix(time.timestamp() as u64));
        assert_eq!(ft.to_datetime().unwrap(), time);
    }

    // Tests that times before the certificate epoch are rejected.
    #[test]
    fn test_pre_epoch_rejection() {
        let time = Utc
            .with_ymd_and_hms(1600, 12, 31, 23, 59, 59)
            .single()
            .unwrap();
        match FileTime::from_datetime(time).unwrap_err() {
            Error::Corrupt => {}
            other => panic!("Expected Corrupt error, got {:?}", other),
        }
    }

    // Tests that milliseconds survive the conversion in both directions.
    #[test]
    fn test_millisecond_precision() {
        let time = Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .unwrap()
            .with_nanosecond(123_000_000)
            .unwrap();
        let ft = FileTime::from_datetime(time).unwrap();
        assert_eq!(ft.intervals % INTERVALS_PER_SECOND, 1_230_000);
        assert_eq!(ft.to_datetime().unwrap(), time);
    }
}
