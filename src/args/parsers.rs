use std::time::Duration;

use courier::config::{parse_delay_value, parse_duration_value};
use courier::error::ValidationError;

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.trim().to_owned()))
        }
        Some(_) | None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    parse_duration_value(s).map_err(|err| ValidationError::InvalidDuration { source: err })
}

pub(super) fn parse_delay_arg(s: &str) -> Result<Duration, ValidationError> {
    parse_delay_value(s).map_err(|err| ValidationError::InvalidDuration { source: err })
}
