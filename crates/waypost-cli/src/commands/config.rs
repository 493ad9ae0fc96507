//! Configuration commands.
//!
//! `waypost config` - Validate the active configuration, optionally printing it.

use waypost_core::WaypostConfig;

/// Validate `config` and optionally print it as YAML.
pub fn check(config: &WaypostConfig, print: bool) -> anyhow::Result<()> {
    config.validate()?;

    if print {
        print!("{}", serde_yaml::to_string(config)?);
    } else {
        println!("✔ Configuration is valid");
        println!("  Endpoints:       {}", config.resolver.endpoints.len());
        println!("  Attempt timeout: {}ms", config.resolver.attempt_timeout_ms);
        println!(
            "  Readiness wait:  {}ms (poll every {}ms)",
            config.persister.max_wait_ms, config.persister.poll_interval_ms
        );
        println!("  Sink backend:    {:?}", config.sink.backend);
    }

    Ok(())
}
