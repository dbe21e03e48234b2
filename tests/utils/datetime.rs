use chrono::NaiveDate;
use tasklist::utils::datetime::*;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
}

#[test]
fn test_format_ymd() {
    let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    assert_eq!(format_ymd(date), "2025-01-15");
    assert_eq!(parse_date("2025-01-15").unwrap(), date);
}

#[test]
fn test_parse_date_rejects_other_formats() {
    assert!(parse_date("15/01/2025").is_err());
    assert!(parse_date("").is_err());
}

#[test]
fn test_parse_timestamp_formats() {
    let expected = at(2025, 6, 1, 9, 30);
    assert_eq!(parse_timestamp("2025-06-01 09:30:00"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01T09:30:00Z"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01T11:30:00+02:00"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01T09:30:00.000"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01"), Some(at(2025, 6, 1, 0, 0)));
    assert_eq!(parse_timestamp("yesterday"), None);
}

#[test]
fn test_calculate_duration() {
    assert_eq!(
        calculate_duration(at(2025, 1, 1, 8, 0), at(2025, 1, 3, 10, 30)),
        "2 day(s), 2 hour(s) and 30 minute(s)"
    );
    assert_eq!(
        calculate_duration(at(2025, 1, 1, 8, 0), at(2025, 1, 1, 8, 0)),
        "0 day(s), 0 hour(s) and 0 minute(s)"
    );
}

#[test]
fn test_calculate_duration_is_order_independent() {
    let start = at(2025, 3, 1, 12, 0);
    let end = at(2025, 3, 2, 13, 5);
    assert_eq!(calculate_duration(end, start), calculate_duration(start, end));
}
