//! # Fechas HTTP
//! src/http/date.rs
//!
//! `Last-Modified`, `If-Modified-Since` y `If-Unmodified-Since` usan el
//! formato IMF-fixdate (RFC 7231 §7.1.1.1). Al parsear también se aceptan
//! los formatos obsoletos RFC 850 y asctime.

use chrono::{DateTime, NaiveDateTime, Utc};

const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(date: DateTime<Utc>) -> String {
    date.format(IMF_FIXDATE).to_string()
}

/// Parsea una fecha HTTP; `None` si no es válida
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDateTime::parse_from_str(value, IMF_FIXDATE) {
        return Some(date.and_utc());
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDateTime::parse_from_str(value, RFC_850) {
        return Some(date.and_utc());
    }
    NaiveDateTime::parse_from_str(value, ASCTIME)
        .ok()
        .map(|date| date.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reference() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap()
    }

    #[test]
    fn test_format() {
        assert_eq!(format_http_date(reference()), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_all_formats() {
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(reference()));
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(reference()));
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(reference()));
    }

    #[test]
    fn test_round_trip_drops_subseconds() {
        let now = Utc::now();
        let parsed = parse_http_date(&format_http_date(now)).unwrap();
        assert_eq!(parsed.timestamp(), now.timestamp());
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_http_date(""), None);
        assert_eq!(parse_http_date("yesterday"), None);
        assert_eq!(parse_http_date("2022-02-01"), None);
    }
}
