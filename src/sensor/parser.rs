// src/sensor/parser.rs

use crate::common::types::{parse_strength, Distance, ParseFailure};

use super::event::{DistanceReading, OccupancyReport, SensorEvent, VersionInfo};

use core::str;

const MOTION_KEYWORD: &str = "mov";
const OCCUPANCY_KEYWORD: &str = "occ";
const ACK_PREFIX: &str = "received message";
const NO_TARGET_LINES: [&str; 4] = ["null", "none", "off", "no target"];

/// Parses a raw frame (terminator already removed) into a [`SensorEvent`].
///
/// # Arguments
///
/// * `bytes`: one line from the sensor, e.g. `b"occ, dis=3.62, str=61.93"`.
///
/// # Returns
///
/// * `Ok(SensorEvent)`: if the line is a detection, no-target, acknowledgement or version line.
/// * `Err(ParseFailure)`: if the line is unrecognized or one of its fields is malformed.
pub fn parse_frame(bytes: &[u8]) -> Result<SensorEvent, ParseFailure> {
    let line = str::from_utf8(bytes).map_err(|_| ParseFailure::NotUtf8)?;
    parse_line(line)
}

/// Same as [`parse_frame`] for input that is already a string.
pub fn parse_line(line: &str) -> Result<SensorEvent, ParseFailure> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseFailure::Empty);
    }

    if starts_with_ignore_case(line, ACK_PREFIX) {
        return Ok(SensorEvent::Acknowledge);
    }

    if NO_TARGET_LINES.iter().any(|k| line.eq_ignore_ascii_case(k)) {
        return Ok(SensorEvent::Occupancy(OccupancyReport::NoTarget));
    }

    if let Some(fields) = strip_keyword(line, MOTION_KEYWORD) {
        return parse_fields(fields).map(SensorEvent::Motion);
    }
    if let Some(fields) = strip_keyword(line, OCCUPANCY_KEYWORD) {
        return parse_fields(fields).map(|r| SensorEvent::Occupancy(OccupancyReport::Target(r)));
    }

    if starts_with_ignore_case(line, "ver") || contains_ignore_case(line, "version") {
        return Ok(SensorEvent::Version(truncated(line)));
    }

    Err(ParseFailure::Unrecognized)
}

// --- Helper: Match a line by its first three characters ---
// The rest of the leading word (`movement`, `occupied`) is not part of the fields.
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    if !starts_with_ignore_case(line, keyword) || !line.is_char_boundary(keyword.len()) {
        return None;
    }
    Some(line[keyword.len()..].trim_start_matches(|c: char| c.is_ascii_alphabetic()))
}

// --- Helper: Parse `key=value` tokens after the keyword ---
// Tokens are separated by commas and/or whitespace.
fn parse_fields(fields: &str) -> Result<DistanceReading, ParseFailure> {
    let mut reading = DistanceReading::default();

    for token in fields.split(|c: char| c == ',' || c.is_ascii_whitespace()).filter(|t| !t.is_empty()) {
        let (key, value) = token.split_once('=').ok_or(ParseFailure::MalformedField)?;
        match key.trim() {
            "dis" => reading.distance = Some(Distance::parse(value)?),
            "str" => reading.strength = Some(parse_strength(value)?),
            // Newer firmware may add fields.
            _ => {}
        }
    }

    Ok(reading)
}

fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len() && line.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn contains_ignore_case(line: &str, needle: &str) -> bool {
    line.as_bytes()
        .windows(needle.len())
        .any(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}

fn truncated(line: &str) -> VersionInfo {
    let mut info = VersionInfo::new();
    for c in line.chars() {
        if info.push(c).is_err() {
            break;
        }
    }
    info
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn reading(cm: Option<u32>, strength: Option<f32>) -> DistanceReading {
        DistanceReading { distance: cm.map(Distance::from_centimeters), strength }
    }

    #[test]
    fn test_parse_motion_frames() {
        assert_eq!(parse_frame(b"mov"), Ok(SensorEvent::Motion(reading(None, None))));
        assert_eq!(parse_frame(b"mov, dis=1.23"), Ok(SensorEvent::Motion(reading(Some(123), None))));
        assert_eq!(parse_frame(b"MOV,dis=0.98"), Ok(SensorEvent::Motion(reading(Some(98), None))));
    }

    #[test]
    fn test_parse_occupancy_frames() {
        assert_eq!(
            parse_frame(b"occ, dis=4.39"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(Some(439), None))))
        );
        assert_eq!(
            parse_frame(b"occ,dis=3.62,str=61.93"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(Some(362), Some(61.93)))))
        );
        assert_eq!(
            parse_frame(b"occ, dis=3.62, str=61.93"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(Some(362), Some(61.93)))))
        );
    }

    #[test]
    fn test_missing_distance_is_absent_not_zero() {
        assert_eq!(
            parse_frame(b"occ"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(None, None))))
        );
        assert_eq!(
            parse_frame(b"occ, str=12.5"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(None, Some(12.5)))))
        );
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        assert_eq!(
            parse_frame(b"occ, dis=2.00, spd=0.4, zone=3"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(Some(200), None))))
        );
        // Trailing separators are tolerated.
        assert_eq!(parse_frame(b"mov, dis=1.00,"), Ok(SensorEvent::Motion(reading(Some(100), None))));
    }

    #[test]
    fn test_keyword_is_matched_by_prefix() {
        assert_eq!(parse_frame(b"mov dis=1.23"), Ok(SensorEvent::Motion(reading(Some(123), None))));
        assert_eq!(parse_frame(b"movement"), Ok(SensorEvent::Motion(reading(None, None))));
        assert_eq!(parse_frame(b"move, dis=1.00"), Ok(SensorEvent::Motion(reading(Some(100), None))));
        assert_eq!(
            parse_frame(b"occ dis=3.62 str=61.93"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(Some(362), Some(61.93)))))
        );
        assert_eq!(
            parse_frame(b"Occupied,dis=0.50"),
            Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(Some(50), None))))
        );
    }

    #[test]
    fn test_no_target_lines() {
        for line in [&b"null"[..], b"none", b"OFF", b"no target", b"  null  "] {
            assert_eq!(parse_frame(line), Ok(SensorEvent::Occupancy(OccupancyReport::NoTarget)));
        }
    }

    #[test]
    fn test_acknowledgement_lines() {
        assert_eq!(parse_frame(b"received message: rmax=6.00"), Ok(SensorEvent::Acknowledge));
        assert_eq!(parse_frame(b"Received Message:test_mode=1"), Ok(SensorEvent::Acknowledge));
    }

    #[test]
    fn test_version_lines() {
        match parse_frame(b"Software Version: 2.1.3") {
            Ok(SensorEvent::Version(v)) => assert_eq!(v.as_str(), "Software Version: 2.1.3"),
            other => panic!("unexpected {:?}", other),
        }
        match parse_frame(b"ver: V2.01") {
            Ok(SensorEvent::Version(v)) => assert_eq!(v.as_str(), "ver: V2.01"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_malformed_frames() {
        assert_eq!(parse_frame(b""), Err(ParseFailure::Empty));
        assert_eq!(parse_frame(b"   "), Err(ParseFailure::Empty));
        assert_eq!(parse_frame(b"hello world"), Err(ParseFailure::Unrecognized));
        assert_eq!(parse_frame(b"mo"), Err(ParseFailure::Unrecognized));
        assert_eq!(parse_frame(b"occ, dis"), Err(ParseFailure::MalformedField));
        assert_eq!(parse_frame(b"occ, dis=abc"), Err(ParseFailure::InvalidDistance));
        assert_eq!(parse_frame(b"occ, dis=1.0, str=x"), Err(ParseFailure::InvalidStrength));
        assert_eq!(parse_frame(&[b'o', b'c', 0xFF]), Err(ParseFailure::NotUtf8));
    }

    #[test]
    fn test_distance_is_rounded_to_two_decimals() {
        let cases: [(&[u8], u32); 5] = [
            (b"occ,dis=0.00", 0),
            (b"occ,dis=1.005", 101),
            (b"occ,dis=2.994", 299),
            (b"occ,dis=7.5", 750),
            (b"occ,dis=10", 1000),
        ];
        for (line, cm) in cases {
            assert_eq!(
                parse_frame(line),
                Ok(SensorEvent::Occupancy(OccupancyReport::Target(reading(Some(cm), None))))
            );
        }
    }
}
