//! Configuration validation.

use crate::config::Config;
use std::collections::HashSet;

/// Validate the configuration.
///
/// Checks for:
/// - At least one service
/// - Non-empty, unique service names
/// - At least one instance per service
/// - Non-empty hosts and non-zero ports
/// - Unique instance ids within a service
/// - A known log level
///
/// # Returns
///
/// `Ok(())` if valid, or every problem found joined with `"; "`.
pub fn validate_config(config: &Config) -> Result<(), String> {
    let mut errors = Vec::new();

    if config.services.is_empty() {
        errors.push("at least one service must be defined".to_string());
    }

    let mut service_names = HashSet::new();

    for service in &config.services {
        if service.name.is_empty() {
            errors.push("service name cannot be empty".to_string());
        }

        if !service_names.insert(service.name.as_str()) {
            errors.push(format!("duplicate service name: {}", service.name));
        }

        if service.instances.is_empty() {
            errors.push(format!(
                "service '{}' must have at least one instance",
                service.name
            ));
        }

        let mut instance_ids = HashSet::new();

        for instance in &service.instances {
            if instance.host.trim().is_empty() {
                errors.push(format!(
                    "service '{}' has an instance with an empty host",
                    service.name
                ));
            }

            if instance.port == Some(0) {
                errors.push(format!(
                    "instance {} in service '{}' has port 0",
                    instance.host, service.name
                ));
            }

            if let Some(id) = instance.instance_id.as_deref() {
                if !instance_ids.insert(id) {
                    errors.push(format!(
                        "duplicate instance id '{}' in service '{}'",
                        id, service.name
                    ));
                }
            }
        }
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.global.log_level.to_lowercase().as_str()) {
        errors.push(format!(
            "invalid log level '{}', must be one of: {}",
            config.global.log_level,
            valid_levels.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}
