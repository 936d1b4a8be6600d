// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! TAI64 and TAI64N fixed-point timestamps.
//!
//! A [`Tai`] counts whole TAI seconds offset by [`TAI_EPOCH`], so that the
//! label `TAI_EPOCH + 10` names the second the Unix epoch began. A [`Tain`]
//! adds a nanosecond field. Both pack big-endian (8 and 12 bytes) and have an
//! ASCII form of `'@'` followed by the hex of the packed bytes.
//!
//! Conversions to and from UTC go through the historical leap-second table
//! in [`crate::leap`]:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use tai_proto::tai64::{TAI_EPOCH, Tain};
//!
//! let utc = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//! let tain = Tain::from_calendar(utc);
//! assert_eq!(tain.seconds().secs(), TAI_EPOCH + 37 + utc.timestamp() as u64);
//! assert_eq!(tain.to_calendar(), Some(utc));
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, ByteOrder};
use chrono::{DateTime, Utc};

use crate::error::{DecodeError, ParseError};
use crate::leap;

/// TAI64 label of 1970-01-01 00:00:00 TAI (2^62 + 10).
pub const TAI_EPOCH: u64 = 4_611_686_018_427_387_914;

/// Nanoseconds in one second; the exclusive upper bound of [`Tain::subsec_nanos`].
pub const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Signed seconds and non-negative nanoseconds relative to the Unix epoch.
fn unix_now() -> (i64, u32) {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(d) => (d.as_secs() as i64, d.subsec_nanos()),
        Err(e) => {
            let d = e.duration();
            let secs = -(d.as_secs() as i64);
            match d.subsec_nanos() {
                0 => (secs, 0),
                n => (secs - 1, NANOS_PER_SECOND - n),
            }
        }
    }
}

/// A TAI64 label: whole seconds of atomic time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tai {
    secs: u64,
}

impl Tai {
    /// Wrap a raw TAI64 label.
    pub const fn from_secs(secs: u64) -> Tai {
        Tai { secs }
    }

    /// The raw TAI64 label.
    pub const fn secs(&self) -> u64 {
        self.secs
    }

    /// The current time, leap-second corrected.
    pub fn now() -> Tai {
        let (secs, _) = unix_now();
        Tai::from_unix(secs)
    }

    /// Label for the UTC instant `unix_secs`, adding the leap offset in
    /// effect at that instant.
    pub fn from_unix(unix_secs: i64) -> Tai {
        Tai {
            secs: TAI_EPOCH
                .wrapping_add_signed(unix_secs)
                .wrapping_add(leap::offset_at(unix_secs)),
        }
    }

    /// Convert back to UTC Unix seconds.
    ///
    /// The epoch constant is subtracted first and the leap offset is then
    /// looked up for that intermediate calendar time, not for the TAI label.
    /// Within a few seconds after a table boundary this differs from an
    /// exact inverse of [`Tai::from_unix`].
    pub fn to_unix(&self) -> i64 {
        let base = self.secs.wrapping_sub(TAI_EPOCH) as i64;
        base.wrapping_sub(leap::offset_at(base) as i64)
    }

    /// UTC calendar time, or `None` if it falls outside chrono's range.
    pub fn to_calendar(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.to_unix(), 0)
    }

    /// Pack as 8 big-endian bytes.
    pub fn pack(&self) -> [u8; 8] {
        let mut buf = [0u8; 8];
        BigEndian::write_u64(&mut buf, self.secs);
        buf
    }

    /// Unpack from 8 big-endian bytes.
    pub fn unpack(buf: [u8; 8]) -> Tai {
        Tai {
            secs: BigEndian::read_u64(&buf),
        }
    }

    /// Render as `'@'` plus 16 uppercase hex digits.
    pub fn to_ascii(&self) -> String {
        format!("@{}", hex::encode_upper(self.pack()))
    }

    /// Parse the 17-character ASCII form.
    pub fn from_ascii(s: &str) -> Result<Tai, DecodeError> {
        decode_label::<8>(s).map(Tai::unpack)
    }

    /// Add whole seconds, returning `None` on overflow. Sub-second parts of
    /// `d` are dropped.
    pub fn checked_add(&self, d: Duration) -> Option<Tai> {
        self.secs.checked_add(d.as_secs()).map(Tai::from_secs)
    }

    /// Subtract whole seconds, returning `None` on underflow.
    pub fn checked_sub(&self, d: Duration) -> Option<Tai> {
        self.secs.checked_sub(d.as_secs()).map(Tai::from_secs)
    }
}

/// A TAI64N label: TAI seconds plus nanoseconds in `[0, 10^9)`.
///
/// Ordering compares seconds first, then nanoseconds.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tain {
    seconds: Tai,
    nanos: u32,
}

impl Tain {
    /// Build a label from its parts.
    ///
    /// # Panics
    ///
    /// Panics if `nanos >= 1_000_000_000`. Use [`Tain::try_new`] for
    /// untrusted input.
    pub fn new(seconds: Tai, nanos: u32) -> Tain {
        match Tain::try_new(seconds, nanos) {
            Some(t) => t,
            None => panic!("invalid Tain: nanoseconds {nanos} out of range"),
        }
    }

    /// Build a label, returning `None` if `nanos` is out of range.
    pub const fn try_new(seconds: Tai, nanos: u32) -> Option<Tain> {
        if nanos >= NANOS_PER_SECOND {
            return None;
        }
        Some(Tain { seconds, nanos })
    }

    /// The whole-second part.
    pub const fn seconds(&self) -> Tai {
        self.seconds
    }

    /// The nanosecond part, always below one second.
    pub const fn subsec_nanos(&self) -> u32 {
        self.nanos
    }

    /// The current time, leap-second corrected.
    pub fn now() -> Tain {
        let (secs, nanos) = unix_now();
        Tain::from_unix(secs, nanos)
    }

    /// Label for a UTC instant given as Unix seconds and nanoseconds.
    ///
    /// # Panics
    ///
    /// Panics if `nanos >= 1_000_000_000`.
    pub fn from_unix(unix_secs: i64, nanos: u32) -> Tain {
        Tain::new(Tai::from_unix(unix_secs), nanos)
    }

    /// Convert back to UTC Unix seconds and nanoseconds (see [`Tai::to_unix`]).
    pub fn to_unix(&self) -> (i64, u32) {
        (self.seconds.to_unix(), self.nanos)
    }

    /// Label for a UTC calendar time.
    pub fn from_calendar(t: DateTime<Utc>) -> Tain {
        // chrono folds a positive leap second into nanos >= 10^9.
        let nanos = t.timestamp_subsec_nanos().min(NANOS_PER_SECOND - 1);
        Tain::from_unix(t.timestamp(), nanos)
    }

    /// UTC calendar time, or `None` if it falls outside chrono's range.
    pub fn to_calendar(&self) -> Option<DateTime<Utc>> {
        let (secs, nanos) = self.to_unix();
        DateTime::from_timestamp(secs, nanos)
    }

    /// Pack as 8 bytes of seconds followed by 4 bytes of nanoseconds, big-endian.
    pub fn pack(&self) -> [u8; 12] {
        let mut buf = [0u8; 12];
        buf[..8].copy_from_slice(&self.seconds.pack());
        BigEndian::write_u32(&mut buf[8..], self.nanos);
        buf
    }

    /// Unpack from 12 big-endian bytes, rejecting a nanosecond field that is
    /// not below one second.
    pub fn unpack(buf: [u8; 12]) -> Result<Tain, ParseError> {
        let mut secs = [0u8; 8];
        secs.copy_from_slice(&buf[..8]);
        let nanos = BigEndian::read_u32(&buf[8..]);
        Tain::try_new(Tai::unpack(secs), nanos).ok_or(ParseError::InvalidField {
            field: "nanoseconds",
            value: nanos,
        })
    }

    /// Render as `'@'` plus 24 uppercase hex digits.
    pub fn to_ascii(&self) -> String {
        format!("@{}", hex::encode_upper(self.pack()))
    }

    /// Parse the 25-character ASCII form. Hex digits may be either case.
    pub fn from_ascii(s: &str) -> Result<Tain, DecodeError> {
        let buf = decode_label::<12>(s)?;
        Tain::unpack(buf).map_err(|_| {
            DecodeError::NanosOutOfRange(u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]))
        })
    }

    /// Add a duration, carrying at most once from nanoseconds into seconds.
    pub fn checked_add(&self, d: Duration) -> Option<Tain> {
        let mut secs = self.seconds.secs.checked_add(d.as_secs())?;
        let mut nanos = self.nanos + d.subsec_nanos();
        if nanos >= NANOS_PER_SECOND {
            nanos -= NANOS_PER_SECOND;
            secs = secs.checked_add(1)?;
        }
        Some(Tain {
            seconds: Tai::from_secs(secs),
            nanos,
        })
    }

    /// Subtract a duration, borrowing at most once from seconds.
    pub fn checked_sub(&self, d: Duration) -> Option<Tain> {
        let mut secs = self.seconds.secs.checked_sub(d.as_secs())?;
        let nanos = if self.nanos >= d.subsec_nanos() {
            self.nanos - d.subsec_nanos()
        } else {
            secs = secs.checked_sub(1)?;
            self.nanos + NANOS_PER_SECOND - d.subsec_nanos()
        };
        Some(Tain {
            seconds: Tai::from_secs(secs),
            nanos,
        })
    }

    /// Time elapsed from `earlier` to `self`, or `None` if `earlier` is later.
    pub fn duration_since(&self, earlier: Tain) -> Option<Duration> {
        let mut secs = self.seconds.secs.checked_sub(earlier.seconds.secs)?;
        let nanos = if self.nanos >= earlier.nanos {
            self.nanos - earlier.nanos
        } else {
            secs = secs.checked_sub(1)?;
            self.nanos + NANOS_PER_SECOND - earlier.nanos
        };
        Some(Duration::new(secs, nanos))
    }
}

fn decode_label<const N: usize>(s: &str) -> Result<[u8; N], DecodeError> {
    let payload = s.strip_prefix('@').ok_or(DecodeError::BadPrefix)?;
    if payload.len() != N * 2 {
        return Err(DecodeError::BadLength {
            expected: N * 2,
            found: payload.len(),
        });
    }
    let mut buf = [0u8; N];
    hex::decode_to_slice(payload, &mut buf).map_err(|_| DecodeError::BadHex)?;
    Ok(buf)
}

impl fmt::Display for Tai {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

impl fmt::Display for Tain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

impl FromStr for Tai {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tai::from_ascii(s)
    }
}

impl FromStr for Tain {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tain::from_ascii(s)
    }
}

impl From<Tai> for Tain {
    fn from(seconds: Tai) -> Tain {
        Tain { seconds, nanos: 0 }
    }
}

impl Add<Duration> for Tain {
    type Output = Tain;

    /// # Panics
    ///
    /// Panics if the result overflows the TAI64 range.
    fn add(self, d: Duration) -> Tain {
        self.checked_add(d)
            .unwrap_or_else(|| panic!("overflow when adding duration to Tain"))
    }
}

impl AddAssign<Duration> for Tain {
    fn add_assign(&mut self, d: Duration) {
        *self = *self + d;
    }
}

impl Sub<Duration> for Tain {
    type Output = Tain;

    /// # Panics
    ///
    /// Panics if the result underflows the TAI64 range.
    fn sub(self, d: Duration) -> Tain {
        self.checked_sub(d)
            .unwrap_or_else(|| panic!("overflow when subtracting duration from Tain"))
    }
}

impl SubAssign<Duration> for Tain {
    fn sub_assign(&mut self, d: Duration) {
        *self = *self - d;
    }
}
