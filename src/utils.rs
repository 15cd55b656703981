pub fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if mins > 0 {
        parts.push(format!("{}m", mins));
    }
    if secs > 0 || (hours == 0 && mins == 0) {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}

/// Countdown display, `MM:SS` (minutes are not wrapped into hours).
pub fn format_clock(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn csv_escape(field: &str) -> String {
    let needs_quote = field.contains([',', '"', '\n', '\r']);
    if !needs_quote {
        return field.to_string();
    }
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Accepts bare minutes (`90`) or a humantime duration (`1h 30m`).
pub fn parse_minutes(input: &str) -> anyhow::Result<u32> {
    let input = input.trim();
    if let Ok(mins) = input.parse::<u32>() {
        return Ok(mins);
    }
    let duration = humantime::parse_duration(input)
        .map_err(|e| anyhow::anyhow!("Invalid duration '{}': {}", input, e))?;
    u32::try_from(duration.as_secs() / 60)
        .map_err(|_| anyhow::anyhow!("Duration '{}' is too long", input))
}
