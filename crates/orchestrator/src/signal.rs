use crate::timecode::parse_timecode;

/// Structured signal extracted from one engine diagnostic line.
#[derive(Debug, Clone, PartialEq)]
pub enum LogSignal {
    /// Total media duration in seconds, announced near the start of a run.
    DurationFound(f64),
    /// Current encode position in seconds.
    PositionUpdate(f64),
    /// Throughput update; either field may be absent independently.
    RateUpdate {
        fps: Option<f64>,
        /// Speed multiplier token as printed by the engine, e.g. `"2.0x"`.
        speed: Option<String>,
    },
}

/// Extract every structured signal embedded in one diagnostic line.
///
/// Markers are matched independently, so a single frame-status line like
/// `frame=100 fps=25 ... time=00:01:00.00 ... speed=2.0x` yields both a
/// `PositionUpdate` and a `RateUpdate`. Lines matching no marker yield
/// nothing. A marker whose value fails to parse contributes no signal
/// (fail soft), including time codes rejected by the time-code parser.
pub fn extract_signals(line: &str) -> Vec<LogSignal> {
    let mut signals = Vec::new();

    if let Some(seconds) = extract_timecode(line, "Duration: ") {
        signals.push(LogSignal::DurationFound(seconds));
    }

    if let Some(seconds) = extract_timecode(line, "time=") {
        signals.push(LogSignal::PositionUpdate(seconds));
    }

    let fps = extract_value(line, "fps=").and_then(|v| v.parse::<f64>().ok());
    let speed = extract_value(line, "speed=")
        .filter(|v| v.trim_end_matches('x').parse::<f64>().is_ok());
    if fps.is_some() || speed.is_some() {
        signals.push(LogSignal::RateUpdate { fps, speed });
    }

    signals
}

/// Pull the whitespace-delimited token following `marker`, tolerating
/// free-form text around it and whitespace between `=` and the value
/// (the engine pads short values, e.g. `fps= 30`).
fn extract_value(line: &str, marker: &str) -> Option<String> {
    let rest = line.split(marker).nth(1)?;
    rest.split_whitespace().next().map(str::to_string)
}

fn extract_timecode(line: &str, marker: &str) -> Option<f64> {
    let token = extract_value(line, marker)?;
    parse_timecode(token.trim_end_matches(',')).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_line_yields_duration_found() {
        let signals = extract_signals("Duration: 00:02:00.00, start: 0.0, bitrate: 128 kb/s");
        assert_eq!(signals, vec![LogSignal::DurationFound(120.0)]);
    }

    #[test]
    fn frame_status_line_yields_position_and_rate() {
        let line = "frame=  100 fps= 25 q=28.0 size=     512kB time=00:01:00.00 bitrate= 838.9kbits/s speed=2.0x";
        let signals = extract_signals(line);
        assert_eq!(
            signals,
            vec![
                LogSignal::PositionUpdate(60.0),
                LogSignal::RateUpdate {
                    fps: Some(25.0),
                    speed: Some("2.0x".to_string()),
                },
            ]
        );
    }

    #[test]
    fn unrelated_lines_yield_nothing() {
        assert!(extract_signals("Stream mapping:").is_empty());
        assert!(extract_signals("  Stream #0:0 -> #0:0 (h264 -> libx264)").is_empty());
        assert!(extract_signals("").is_empty());
    }

    #[test]
    fn malformed_timecode_is_downgraded_to_no_signal() {
        assert!(extract_signals("Duration: N/A, start: 0.0").is_empty());
        assert!(extract_signals("time=garbage bitrate=0").is_empty());
    }

    #[test]
    fn rate_fields_are_independent() {
        assert_eq!(
            extract_signals("frame=10 fps=30.5 q=28.0"),
            vec![LogSignal::RateUpdate {
                fps: Some(30.5),
                speed: None,
            }]
        );
        assert_eq!(
            extract_signals("size=12kB speed=0.95x"),
            vec![LogSignal::RateUpdate {
                fps: None,
                speed: Some("0.95x".to_string()),
            }]
        );
    }

    #[test]
    fn unparseable_rate_marker_contributes_nothing() {
        // fps value is junk, speed still parses
        assert_eq!(
            extract_signals("fps=?? speed=1.1x"),
            vec![LogSignal::RateUpdate {
                fps: None,
                speed: Some("1.1x".to_string()),
            }]
        );
        // both junk: no signal at all
        assert!(extract_signals("fps=?? speed=fast").is_empty());
    }
}
