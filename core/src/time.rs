use anyhow::{anyhow, Result};

/// Minutes from `90`, `45m`, `2h` or `1h30m`.
pub fn parse_minutes(input: &str) -> Result<u32> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return Err(anyhow!("Empty duration string"));
    }

    if let Ok(minutes) = input.parse::<u32>() {
        return Ok(minutes);
    }

    let mut total: u32 = 0;
    let mut digits = String::new();
    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let num: u32 = digits.parse().map_err(|_| anyhow!("Invalid duration number"))?;
        digits.clear();
        let minutes = match c {
            'm' => num,
            'h' => num.checked_mul(60).ok_or_else(|| anyhow!("Duration too large"))?,
            _ => return Err(anyhow!("Unknown duration unit: {}", c)),
        };
        total = total.checked_add(minutes).ok_or_else(|| anyhow!("Duration too large"))?;
    }

    if !digits.is_empty() {
        return Err(anyhow!("Missing unit after {}", digits));
    }
    Ok(total)
}

/// `MM:SS`, or `HH:MM:SS` once an hour has passed.
pub fn format_elapsed(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes() {
        assert_eq!(parse_minutes("90").unwrap(), 90);
        assert_eq!(parse_minutes("45m").unwrap(), 45);
        assert_eq!(parse_minutes("2h").unwrap(), 120);
        assert_eq!(parse_minutes("1h30m").unwrap(), 90);
        assert_eq!(parse_minutes(" 1H ").unwrap(), 60);

        assert!(parse_minutes("").is_err());
        assert!(parse_minutes("abc").is_err());
        assert!(parse_minutes("1d").is_err());
        assert!(parse_minutes("1h30").is_err());
        assert!(parse_minutes("-5").is_err());
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
        assert_eq!(format_elapsed(3600), "01:00:00");
        assert_eq!(format_elapsed(3 * 3600 + 61), "03:01:01");
    }
}
