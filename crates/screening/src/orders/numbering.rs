//! Human-readable order numbers: `YYYYMMDD-CCC-NNNN`.

use chrono::{DateTime, Days, NaiveDate, Utc};
use uuid::Uuid;

const CODE_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_HEX_DIGITS: usize = 6;

/// Three-character code derived from the customer id's leading hex digits.
///
/// Non-hex characters (hyphens) are ignored and short ids are right-padded
/// with `0`. Each pair of hex digits is read as a byte and mapped into the
/// 36-character alphabet.
pub fn customer_code(customer_id: &str) -> String {
    let mut digits: Vec<u8> = customer_id
        .chars()
        .filter_map(|ch| ch.to_digit(16))
        .take(CODE_HEX_DIGITS)
        .map(|digit| digit as u8)
        .collect();
    digits.resize(CODE_HEX_DIGITS, 0);

    digits
        .chunks(2)
        .map(|pair| {
            let byte = pair[0] * 16 + pair[1];
            CODE_ALPHABET[usize::from(byte) % CODE_ALPHABET.len()] as char
        })
        .collect()
}

pub fn customer_code_for(customer_id: &Uuid) -> String {
    customer_code(&customer_id.simple().to_string())
}

pub fn format_order_number(day: NaiveDate, code: &str, sequence: u32) -> String {
    format!("{}-{}-{:04}", day.format("%Y%m%d"), code, sequence)
}

/// Half-open UTC window `[start of day, start of next day)`.
pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
    let next = day
        .checked_add_days(Days::new(1))
        .map(|next| next.and_time(chrono::NaiveTime::MIN).and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, next)
}

pub fn within_day(instant: DateTime<Utc>, day: NaiveDate) -> bool {
    let (start, end) = day_bounds(day);
    instant >= start && instant < end
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn code_maps_hex_pairs_into_alphabet() {
        // ab = 171 -> 27 -> '1', cd = 205 -> 25 -> 'Z', 12 = 18 -> 'S'
        assert_eq!(customer_code("abcd1234-0000-0000-0000-000000000000"), "1ZS");
    }

    #[test]
    fn code_is_stable_and_ignores_case_and_hyphens() {
        let id = Uuid::parse_str("ABCD1234-5678-90ab-cdef-1234567890ab").expect("uuid");
        assert_eq!(customer_code_for(&id), customer_code_for(&id));
        assert_eq!(customer_code_for(&id), customer_code("ab-cd-12"));
    }

    #[test]
    fn short_ids_are_padded() {
        assert_eq!(customer_code("f"), customer_code("f00000"));
        assert_eq!(customer_code("").len(), 3);
        assert_eq!(customer_code(""), "AAA");
    }

    #[test]
    fn order_number_pads_sequence() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        assert_eq!(format_order_number(day, "XYZ", 3), "20240305-XYZ-0003");
        assert_eq!(format_order_number(day, "XYZ", 12345), "20240305-XYZ-12345");
    }

    #[test]
    fn day_bounds_are_half_open() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).expect("valid date");
        let midnight = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let last_second = Utc.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap();
        let next_midnight = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();

        assert!(within_day(midnight, day));
        assert!(within_day(last_second, day));
        assert!(!within_day(next_midnight, day));
    }
}
