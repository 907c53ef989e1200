use std::time::Duration;

use crate::error::ConfigError;

/// Parses `500ms`, `2s`, `1m`, `1h`, or a bare number of seconds.
///
/// # Errors
///
/// Returns an error for empty input, unknown units, overflow, or zero.
pub fn parse_duration_value(value: &str) -> Result<Duration, ConfigError> {
    let duration = parse_delay_value(value)?;
    if duration.is_zero() {
        return Err(ConfigError::DurationZero);
    }
    Ok(duration)
}

/// Same grammar as [`parse_duration_value`], but `0` is accepted.
///
/// # Errors
///
/// Returns an error for empty input, unknown units, or overflow.
pub fn parse_delay_value(value: &str) -> Result<Duration, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ConfigError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ConfigError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ConfigError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ConfigError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ConfigError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    Ok(duration)
}
