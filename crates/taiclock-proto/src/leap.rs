// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/// A single leap-second table entry.
///
/// From `effective` (seconds since the Unix epoch, UTC) onward, TAI is
/// ahead of UTC by `offset` seconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LeapSecond {
    /// UTC instant (Unix seconds) at which the offset takes effect.
    pub effective: i64,
    /// Cumulative TAI - UTC offset in seconds.
    pub offset: u64,
}

const fn leap(effective: i64, offset: u64) -> LeapSecond {
    LeapSecond { effective, offset }
}

/// Every leap second announced by the IERS from 1972 through 2017, in
/// ascending order.
pub const LEAP_SECONDS: [LeapSecond; 27] = [
    leap(78_796_800, 11),    // 1972-07-01
    leap(94_694_400, 12),    // 1973-01-01
    leap(126_230_400, 13),   // 1974-01-01
    leap(157_766_400, 14),   // 1975-01-01
    leap(189_302_400, 15),   // 1976-01-01
    leap(220_924_800, 16),   // 1977-01-01
    leap(252_460_800, 17),   // 1978-01-01
    leap(283_996_800, 18),   // 1979-01-01
    leap(315_532_800, 19),   // 1980-01-01
    leap(362_793_600, 20),   // 1981-07-01
    leap(394_329_600, 21),   // 1982-07-01
    leap(425_865_600, 22),   // 1983-07-01
    leap(489_024_000, 23),   // 1985-07-01
    leap(567_993_600, 24),   // 1988-01-01
    leap(631_152_000, 25),   // 1990-01-01
    leap(662_688_000, 26),   // 1991-01-01
    leap(709_948_800, 27),   // 1992-07-01
    leap(741_484_800, 28),   // 1993-07-01
    leap(773_020_800, 29),   // 1994-07-01
    leap(820_454_400, 30),   // 1996-01-01
    leap(867_715_200, 31),   // 1997-07-01
    leap(915_148_800, 32),   // 1999-01-01
    leap(1_136_073_600, 33), // 2006-01-01
    leap(1_230_768_000, 34), // 2009-01-01
    leap(1_341_100_800, 35), // 2012-07-01
    leap(1_435_708_800, 36), // 2015-07-01
    leap(1_483_228_800, 37), // 2017-01-01
];

/// Return the TAI - UTC offset in effect at `unix_secs`.
///
/// The latest entry whose effective time is `<= unix_secs` wins, so an
/// instant exactly on a boundary already carries the new offset. Instants
/// before the first entry have offset 0.
pub fn offset_at(unix_secs: i64) -> u64 {
    LEAP_SECONDS
        .iter()
        .rev()
        .find(|ls| unix_secs >= ls.effective)
        .map_or(0, |ls| ls.offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_table_is_sorted_and_cumulative() {
        for pair in LEAP_SECONDS.windows(2) {
            assert!(pair[0].effective < pair[1].effective);
            assert_eq!(pair[0].offset + 1, pair[1].offset);
        }
    }

    #[test]
    fn test_table_matches_calendar_dates() {
        let first = Utc.with_ymd_and_hms(1972, 7, 1, 0, 0, 0).unwrap();
        let last = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(LEAP_SECONDS[0].effective, first.timestamp());
        assert_eq!(LEAP_SECONDS[26].effective, last.timestamp());
    }

    #[test]
    fn test_offset_before_table() {
        assert_eq!(offset_at(0), 0);
        assert_eq!(offset_at(78_796_799), 0);
        assert_eq!(offset_at(-1_000_000), 0);
    }

    #[test]
    fn test_offset_boundary_takes_new_entry() {
        assert_eq!(offset_at(78_796_800), 11);
        assert_eq!(offset_at(1_483_228_799), 36);
        assert_eq!(offset_at(1_483_228_800), 37);
    }

    #[test]
    fn test_offset_after_table() {
        assert_eq!(offset_at(1_700_000_000), 37);
        assert_eq!(offset_at(i64::MAX), 37);
    }
}
