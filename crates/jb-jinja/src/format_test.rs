use super::*;

#[test]
fn test_parse_timezone() {
    assert_eq!(parse_timezone("Europe/Paris").unwrap(), Tz::Europe__Paris);
    let err = parse_timezone("Mars/Olympus").unwrap_err();
    assert!(matches!(err, JinjaError::InvalidTimezone { .. }));
}

#[test]
fn test_format_date_from_timestamp() {
    let out = format_date(&Value::from(0), "%Y-%m-%d %H:%M", Tz::UTC).unwrap();
    assert_eq!(out, "1970-01-01 00:00");
}

#[test]
fn test_format_date_converts_timezone() {
    let out = format_date(
        &Value::from("2024-06-01T12:00:00Z"),
        "%H:%M",
        Tz::Europe__Paris,
    )
    .unwrap();
    assert_eq!(out, "14:00");
}

#[test]
fn test_format_date_naive_string_uses_timezone() {
    let out = format_date(
        &Value::from("2024-01-15 08:30:00"),
        "%B %-d, %Y %H:%M",
        Tz::America__New_York,
    )
    .unwrap();
    assert_eq!(out, "January 15, 2024 08:30");
}

#[test]
fn test_format_date_plain_date() {
    let out = format_date(&Value::from("2024-02-29"), "%d/%m/%Y", Tz::UTC).unwrap();
    assert_eq!(out, "29/02/2024");
}

#[test]
fn test_format_date_rejects_garbage() {
    assert!(format_date(&Value::from("not a date"), "%Y", Tz::UTC).is_err());
    assert!(format_date(&Value::from(vec![1, 2]), "%Y", Tz::UTC).is_err());
}

#[test]
fn test_format_date_invalid_format() {
    assert!(format_date(&Value::from(0), "%Q", Tz::UTC).is_err());
}

#[test]
fn test_format_interval() {
    assert_eq!(format_interval(3 * 86_400 + 3_600, "%d days"), "3 days");
    assert_eq!(
        format_interval(90_061, "%d d %h h %i m %s s"),
        "1 d 1 h 1 m 1 s"
    );
    assert_eq!(format_interval(-86_400, "%R%a"), "-1");
    assert_eq!(format_interval(86_400, "%r%a%%"), "1%");
}

#[test]
fn test_format_number() {
    assert_eq!(format_number(1234567.891, 2, ".", ","), "1,234,567.89");
    assert_eq!(format_number(1234.5, 0, ".", ","), "1,235");
    assert_eq!(format_number(1234.5, 1, ",", " "), "1 234,5");
    assert_eq!(format_number(-1234.0, 0, ".", ","), "-1,234");
    assert_eq!(format_number(-0.0001, 2, ".", ","), "0.00");
    assert_eq!(format_number(999.0, 0, ".", ","), "999");
}

#[test]
fn test_format_number_caps_decimals() {
    let expected = format!("1.{}", "0".repeat(MAX_DECIMALS as usize));
    assert_eq!(format_number(1.0, 400, ".", ","), expected);
    assert_eq!(format_number(1.0, u32::MAX, ".", ","), expected);
    assert_eq!(format_number(1e300, 20, ".", "").len(), 301 + 1 + 20);
}
