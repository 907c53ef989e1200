use crate::error::ConfigError;

use super::settings::Settings;
use super::types::ConfigFile;

/// Applies configuration file values on top of `settings`.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(settings: &mut Settings, config: &ConfigFile) -> Result<(), ConfigError> {
    if let Some(delay) = config.inter_job_delay.as_ref() {
        settings.executor.inter_job_delay = delay
            .to_delay()
            .map_err(|err| ConfigError::for_field("inter_job_delay", err))?;
    }

    if let Some(timeout) = config.timeout.as_ref() {
        let timeout = timeout
            .to_duration()
            .map_err(|err| ConfigError::for_field("timeout", err))?;
        settings.set_request_timeout(timeout);
    }

    if let Some(connect_timeout) = config.connect_timeout.as_ref() {
        settings.client.connect_timeout = connect_timeout
            .to_duration()
            .map_err(|err| ConfigError::for_field("connect_timeout", err))?;
    }

    if let Some(redirect) = config.redirect {
        settings.client.redirect_limit = redirect;
    }

    if let Some(user_agent) = config.user_agent.as_ref() {
        let user_agent = user_agent.trim();
        if user_agent.is_empty() {
            return Err(ConfigError::EmptyField {
                field: "user_agent",
            });
        }
        settings.executor.user_agent = user_agent.to_owned();
    }

    Ok(())
}
