// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::utils::log;

/// Validate the configuration and log its effective values.
pub fn run_validate(config: &Config) -> Result<()> {
    log::header("Validating configuration");

    if let Err(e) = config.validate() {
        ::log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    ::log::info!("Config OK");
    log::sub_item(&format!("Source: {}", config.source.url));
    log::sub_item(&format!("Array key: {}", config.source.array_key));
    log::sub_item(&format!(
        "Page timeout: {}s, resolve timeout: {}s x{} attempts",
        config.source.timeout_secs, config.resolver.timeout_secs, config.resolver.attempts
    ));
    log::sub_item(&format!("Worker pool: {}", config.resolver.pool_size));
    log::sub_item(&format!(
        "Short-link hosts: {}",
        config.resolver.short_link_hosts.join(", ")
    ));
    log::sub_item(&format!(
        "Output: {} (UTC{:+})",
        config.output.path.display(),
        config.output.utc_offset_hours
    ));
    Ok(())
}
