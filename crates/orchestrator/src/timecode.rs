use thiserror::Error;

/// A time code string did not match the `HH:MM:SS.ff` shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed time code: '{0}'")]
pub struct MalformedTimeCode(pub String);

/// Parse an engine time code of the fixed shape `HH:MM:SS.ff` into seconds.
///
/// Example: `"00:01:30.50"` -> `90.5`
pub fn parse_timecode(text: &str) -> Result<f64, MalformedTimeCode> {
    let malformed = || MalformedTimeCode(text.to_string());

    let mut parts = text.split(':');
    let (hours, minutes, seconds) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(h), Some(m), Some(s), None) => (h, m, s),
        _ => return Err(malformed()),
    };

    let hours: u32 = hours.parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.parse().map_err(|_| malformed())?;

    // f64::parse accepts forms like "1e3" or "inf" that are not valid
    // time codes, so restrict the seconds field to digits and one dot.
    if seconds.is_empty()
        || !seconds.chars().all(|c| c.is_ascii_digit() || c == '.')
        || seconds.chars().filter(|&c| c == '.').count() > 1
    {
        return Err(malformed());
    }
    let seconds: f64 = seconds.parse().map_err(|_| malformed())?;

    Ok(f64::from(hours) * 3600.0 + f64::from(minutes) * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_reference_values() {
        assert_eq!(parse_timecode("00:01:30.50").unwrap(), 90.5);
        assert_eq!(parse_timecode("01:00:00.00").unwrap(), 3600.0);
        assert_eq!(parse_timecode("00:02:00.00").unwrap(), 120.0);
        assert_eq!(parse_timecode("00:00:00.00").unwrap(), 0.0);
    }

    #[test]
    fn rejects_malformed_inputs() {
        for bad in [
            "", "abc", "00:01", "00:01:02:03", "-1:00:00.0", "00:xx:00.0", "00:00:1e3",
            "00:00:inf", "00:00:1.2.3",
        ] {
            assert!(
                parse_timecode(bad).is_err(),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    proptest! {
        /// Any well-formed HH:MM:SS.ff string parses to the arithmetic
        /// combination of its components.
        #[test]
        fn round_trips_components(
            hours in 0u32..100,
            minutes in 0u32..60,
            seconds in 0u32..60,
            centis in 0u32..100,
        ) {
            let text = format!("{:02}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis);
            let expected = f64::from(hours) * 3600.0
                + f64::from(minutes) * 60.0
                + f64::from(seconds)
                + f64::from(centis) / 100.0;

            let parsed = parse_timecode(&text).unwrap();
            prop_assert!(
                (parsed - expected).abs() < 1e-9,
                "'{}' parsed to {}, expected {}",
                text, parsed, expected
            );
        }
    }
}
