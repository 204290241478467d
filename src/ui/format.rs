/// Countdown display, `m:ss`.
pub fn format_clock(remaining_secs: u32) -> String {
    format!("{}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

/// Human test length: `30s`, `1 min`, `2.5 min`.
pub fn format_duration(secs: u32) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{:.1} min", secs as f64 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(60), "1:00");
        assert_eq!(format_clock(125), "2:05");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(30), "30s");
        assert_eq!(format_duration(60), "1 min");
        assert_eq!(format_duration(600), "10 min");
        assert_eq!(format_duration(150), "2.5 min");
    }
}
