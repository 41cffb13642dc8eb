//! Packed-BCD and little-endian field helpers.
//!
//! The controller wire format packs temporal fields as binary-coded decimal
//! (two decimal digits per byte) and numeric fields as little-endian
//! integers, all at fixed offsets inside a 64-byte frame. These functions
//! mirror that shape directly rather than modelling each operation's payload
//! as its own struct, since the same handful of primitive shapes (u8, u16,
//! u32, IPv4, MAC, packed date, packed datetime, packed short time, 24-bit
//! PIN, bool) recur across every operation.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ProtocolError, Result};

/// Reads a single byte.
#[must_use]
pub fn get_u8(buf: &[u8; 64], offset: usize) -> u8 {
    buf[offset]
}

/// Writes a single byte.
pub fn set_u8(buf: &mut [u8; 64], offset: usize, value: u8) {
    buf[offset] = value;
}

/// Reads a little-endian `u16`.
#[must_use]
pub fn get_u16(buf: &[u8; 64], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Writes a little-endian `u16`.
pub fn set_u16(buf: &mut [u8; 64], offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

/// Reads a little-endian `u32`.
#[must_use]
pub fn get_u32(buf: &[u8; 64], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// Writes a little-endian `u32`.
pub fn set_u32(buf: &mut [u8; 64], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Reads a boolean (`0x00` = false, any other byte = true).
#[must_use]
pub fn get_bool(buf: &[u8; 64], offset: usize) -> bool {
    buf[offset] != 0x00
}

/// Writes a boolean as `0x00`/`0x01`.
pub fn set_bool(buf: &mut [u8; 64], offset: usize, value: bool) {
    buf[offset] = u8::from(value);
}

/// Reads a 4-byte dotted-quad IPv4 address.
#[must_use]
pub fn get_ipv4(buf: &[u8; 64], offset: usize) -> std::net::Ipv4Addr {
    std::net::Ipv4Addr::new(buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3])
}

/// Writes a 4-byte dotted-quad IPv4 address.
pub fn set_ipv4(buf: &mut [u8; 64], offset: usize, value: std::net::Ipv4Addr) {
    buf[offset..offset + 4].copy_from_slice(&value.octets());
}

/// Reads a 6-byte MAC address as colon-separated lowercase hex.
#[must_use]
pub fn get_mac(buf: &[u8; 64], offset: usize) -> String {
    let b = &buf[offset..offset + 6];
    format!("{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", b[0], b[1], b[2], b[3], b[4], b[5])
}

/// Writes a 6-byte MAC address from colon-separated hex (`aa:bb:cc:dd:ee:ff`).
///
/// # Errors
///
/// Returns `InvalidArgument` if `mac` is not six colon-separated hex octets.
pub fn set_mac(buf: &mut [u8; 64], offset: usize, mac: &str) -> Result<()> {
    let mut octets = [0u8; 6];
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return Err(ProtocolError::InvalidArgument(format!("invalid MAC address: {mac}")));
    }
    for (slot, part) in octets.iter_mut().zip(parts) {
        *slot = u8::from_str_radix(part, 16)
            .map_err(|_| ProtocolError::InvalidArgument(format!("invalid MAC address: {mac}")))?;
    }
    buf[offset..offset + 6].copy_from_slice(&octets);
    Ok(())
}

/// Reads a 2-byte firmware version as `v<major-hex>.<minor-hex-hex>`
/// (e.g. bytes `08 92` decode to `v8.92`).
#[must_use]
pub fn get_version(buf: &[u8; 64], offset: usize) -> String {
    format!("v{:x}.{:02x}", buf[offset], buf[offset + 1])
}

/// Reads a 24-bit little-endian PIN.
#[must_use]
pub fn get_pin(buf: &[u8; 64], offset: usize) -> u32 {
    u32::from(buf[offset]) | (u32::from(buf[offset + 1]) << 8) | (u32::from(buf[offset + 2]) << 16)
}

/// Writes a 24-bit little-endian PIN.
///
/// # Errors
///
/// Returns `InvalidArgument` if `pin` does not fit in 24 bits.
pub fn set_pin(buf: &mut [u8; 64], offset: usize, pin: u32) -> Result<()> {
    if pin > 0x00ff_ffff {
        return Err(ProtocolError::InvalidArgument(format!("pin {pin} does not fit in 24 bits")));
    }
    buf[offset] = (pin & 0xff) as u8;
    buf[offset + 1] = ((pin >> 8) & 0xff) as u8;
    buf[offset + 2] = ((pin >> 16) & 0xff) as u8;
    Ok(())
}

/// Renders `width` bytes starting at `offset` as a decimal digit string,
/// two digits per byte (e.g. `[0x20, 0x18]` -> `"2018"`).
fn bcd_digits(buf: &[u8; 64], offset: usize, width: usize) -> String {
    let mut s = String::with_capacity(width * 2);
    for &byte in &buf[offset..offset + width] {
        s.push_str(&format!("{byte:02x}"));
    }
    s
}

/// Packs a 4-digit year, 2-digit month, 2-digit day into `width` BCD bytes.
fn pack_decimal(buf: &mut [u8; 64], offset: usize, digits: &str) -> Result<()> {
    if digits.len() % 2 != 0 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProtocolError::InvalidArgument(format!(
            "value does not fit the wire BCD field: {digits}"
        )));
    }
    for (i, pair) in digits.as_bytes().chunks(2).enumerate() {
        let hi = (pair[0] - b'0') << 4;
        let lo = pair[1] - b'0';
        buf[offset + i] = hi | lo;
    }
    Ok(())
}

/// Packs a required date (BCD-4, `YYYYMMDD`).
///
/// # Errors
///
/// Returns `InvalidArgument` if `date`'s year is outside `0000..=9999`.
pub fn set_date(buf: &mut [u8; 64], offset: usize, date: NaiveDate) -> Result<()> {
    if !(0..=9999).contains(&date.year()) {
        return Err(ProtocolError::InvalidArgument(format!("date out of range: {date}")));
    }
    pack_decimal(buf, offset, &date.format("%Y%m%d").to_string())
}

/// Unpacks a required date (BCD-4, `YYYYMMDD`). Never fails: an invalid
/// calendar value degrades to the Unix epoch date, matching §4.1's "unpack
/// never fails for required fields" contract.
#[must_use]
pub fn get_date(buf: &[u8; 64], offset: usize) -> NaiveDate {
    get_optional_date(buf, offset).unwrap_or(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default())
}

/// Unpacks an optional date (BCD-4, `YYYYMMDD`). Returns `None` if the
/// digits are non-decimal or do not form a valid calendar date.
#[must_use]
pub fn get_optional_date(buf: &[u8; 64], offset: usize) -> Option<NaiveDate> {
    let digits = bcd_digits(buf, offset, 4);
    let year = digits.get(0..4)?.parse::<i32>().ok()?;
    let month = digits.get(4..6)?.parse::<u32>().ok()?;
    let day = digits.get(6..8)?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Unpacks a short date (BCD-3, `YYMMDD`), prepending century `20` before
/// parsing, so the represented range is always `2000..=2099`.
#[must_use]
pub fn get_short_date(buf: &[u8; 64], offset: usize) -> Option<NaiveDate> {
    let digits = bcd_digits(buf, offset, 3);
    let year = 2000 + digits.get(0..2)?.parse::<i32>().ok()?;
    let month = digits.get(2..4)?.parse::<u32>().ok()?;
    let day = digits.get(4..6)?.parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Packs an optional date (BCD-4). `None` writes all-zero bytes, which
/// `get_optional_date` reads back as `None` (month/day 0 is never valid).
///
/// # Errors
///
/// Returns `InvalidArgument` if `date` is `Some` and its year is outside
/// `0000..=9999`.
pub fn set_optional_date(buf: &mut [u8; 64], offset: usize, date: Option<NaiveDate>) -> Result<()> {
    match date {
        Some(date) => set_date(buf, offset, date),
        None => {
            buf[offset..offset + 4].fill(0);
            Ok(())
        }
    }
}

/// Packs a required datetime (BCD-7, `YYYYMMDDhhmmss`).
///
/// # Errors
///
/// Returns `InvalidArgument` if `datetime`'s year is outside `0000..=9999`.
pub fn set_datetime(buf: &mut [u8; 64], offset: usize, datetime: NaiveDateTime) -> Result<()> {
    if !(0..=9999).contains(&datetime.year()) {
        return Err(ProtocolError::InvalidArgument(format!("datetime out of range: {datetime}")));
    }
    pack_decimal(buf, offset, &datetime.format("%Y%m%d%H%M%S").to_string())
}

/// Unpacks a required datetime (BCD-7). Degrades to the Unix epoch instant
/// if the digits are invalid, per §4.1.
#[must_use]
pub fn get_datetime(buf: &[u8; 64], offset: usize) -> NaiveDateTime {
    get_optional_datetime(buf, offset).unwrap_or(
        NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap_or_default()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default(),
    )
}

/// Unpacks an optional datetime (BCD-7, `YYYYMMDDhhmmss`). Returns `None`
/// if the digits are non-decimal or do not form a valid calendar instant.
#[must_use]
pub fn get_optional_datetime(buf: &[u8; 64], offset: usize) -> Option<NaiveDateTime> {
    let digits = bcd_digits(buf, offset, 7);
    let date = {
        let year = digits.get(0..4)?.parse::<i32>().ok()?;
        let month = digits.get(4..6)?.parse::<u32>().ok()?;
        let day = digits.get(6..8)?.parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)?
    };
    let hour = digits.get(8..10)?.parse::<u32>().ok()?;
    let minute = digits.get(10..12)?.parse::<u32>().ok()?;
    let second = digits.get(12..14)?.parse::<u32>().ok()?;
    date.and_hms_opt(hour, minute, second)
}

/// Unpacks a required time-of-day (BCD-3, `HHmmss`). Degrades to midnight
/// on invalid digits, per §4.1.
#[must_use]
pub fn get_time(buf: &[u8; 64], offset: usize) -> NaiveTime {
    get_optional_time(buf, offset).unwrap_or_default()
}

/// Unpacks an optional time-of-day (BCD-3, `HHmmss`).
#[must_use]
pub fn get_optional_time(buf: &[u8; 64], offset: usize) -> Option<NaiveTime> {
    let digits = bcd_digits(buf, offset, 3);
    let hour = digits.get(0..2)?.parse::<u32>().ok()?;
    let minute = digits.get(2..4)?.parse::<u32>().ok()?;
    let second = digits.get(4..6)?.parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Unpacks a required short date (BCD-3, `YYMMDD`, century `20`). Degrades
/// to the Unix epoch date on invalid digits, per §4.1.
#[must_use]
pub fn get_short_date_required(buf: &[u8; 64], offset: usize) -> NaiveDate {
    get_short_date(buf, offset).unwrap_or(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default())
}

/// Packs a short `HH:mm` time (BCD-2). An all-zero/absent segment
/// (`None`) encodes as `00:00`.
pub fn set_hhmm(buf: &mut [u8; 64], offset: usize, value: Option<NaiveTime>) {
    let text = value.map_or_else(|| "0000".to_string(), |t| t.format("%H%M").to_string());
    pack_decimal(buf, offset, &text).unwrap_or_else(|_| {
        buf[offset] = 0;
        buf[offset + 1] = 0;
    });
}

/// Unpacks a short `HH:mm` time (BCD-2). Invalid digits decode to `None`.
#[must_use]
pub fn get_hhmm(buf: &[u8; 64], offset: usize) -> Option<NaiveTime> {
    let digits = bcd_digits(buf, offset, 2);
    let hour = digits.get(0..2)?.parse::<u32>().ok()?;
    let minute = digits.get(2..4)?.parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn roundtrip_u32() {
        let mut buf = [0u8; 64];
        set_u32(&mut buf, 4, 405_419_896);
        assert_eq!(get_u32(&buf, 4), 405_419_896);
    }

    #[test]
    fn mac_roundtrip() {
        let mut buf = [0u8; 64];
        set_mac(&mut buf, 20, "00:12:23:34:45:56").unwrap();
        assert_eq!(get_mac(&buf, 20), "00:12:23:34:45:56");
    }

    #[test]
    fn version_decodes_as_spec_example() {
        let mut buf = [0u8; 64];
        buf[26] = 0x08;
        buf[27] = 0x92;
        assert_eq!(get_version(&buf, 26), "v8.92");
    }

    #[test]
    fn optional_date_invalid_digits_is_absent() {
        let mut buf = [0u8; 64];
        buf[20] = 0x20;
        buf[21] = 0x20;
        assert_eq!(get_optional_date(&buf, 20), None);
    }

    #[test]
    fn optional_date_valid_digits_parses() {
        let mut buf = [0u8; 64];
        // 2018-11-05
        buf[28] = 0x20;
        buf[29] = 0x18;
        buf[30] = 0x11;
        buf[31] = 0x05;
        assert_eq!(get_optional_date(&buf, 28), NaiveDate::from_ymd_opt(2018, 11, 5));
    }

    #[test]
    fn short_date_prepends_century_20() {
        let mut buf = [0u8; 64];
        buf[51] = 0x22;
        buf[52] = 0x08;
        buf[53] = 0x23;
        assert_eq!(get_short_date(&buf, 51), NaiveDate::from_ymd_opt(2022, 8, 23));
    }

    #[test]
    fn hhmm_null_segment_encodes_as_0000() {
        let mut buf = [0u8; 64];
        set_hhmm(&mut buf, 24, None);
        assert_eq!(&buf[24..26], &[0x00, 0x00]);
        assert_eq!(get_hhmm(&buf, 24), NaiveTime::from_hms_opt(0, 0, 0));
    }

    #[test]
    fn pin_roundtrip() {
        let mut buf = [0u8; 64];
        set_pin(&mut buf, 24, 123_456).unwrap();
        assert_eq!(get_pin(&buf, 24), 123_456);
    }

    proptest! {
        #[test]
        fn u32_roundtrips_for_any_value(v: u32) {
            let mut buf = [0u8; 64];
            set_u32(&mut buf, 8, v);
            prop_assert_eq!(get_u32(&buf, 8), v);
        }

        #[test]
        fn optional_date_is_none_or_matches_digits(y in 0u32..=9999, m in 0u32..=99, d in 0u32..=99) {
            let mut buf = [0u8; 64];
            pack_decimal(&mut buf, 0, &format!("{y:04}{m:02}{d:02}")).unwrap();
            match get_optional_date(&buf, 0) {
                None => prop_assert!(NaiveDate::from_ymd_opt(y as i32, m, d).is_none()),
                Some(date) => prop_assert_eq!(date, NaiveDate::from_ymd_opt(y as i32, m, d).unwrap()),
            }
        }
    }
}
