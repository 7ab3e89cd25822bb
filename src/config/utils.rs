// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::debug;

use super::Config;

const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Parse the embedded configuration schema.
pub fn config_schema() -> Result<serde_json::Value> {
    serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")
}

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// # Example
///
/// ```bash
/// ./hvac_modbus_simulator --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let formatted_schema =
        serde_json::to_string_pretty(&config_schema()?).context("Failed to format JSON schema")?;
    println!("{}", formatted_schema);
    Ok(())
}

/// Check if a string is a valid IP address
///
/// Validates that a string represents a valid IPv4 or IPv6 address,
/// or is one of the special values like "localhost" or "0.0.0.0".
pub fn is_valid_ip_address(addr: &str) -> bool {
    if addr.parse::<std::net::IpAddr>().is_ok() {
        return true;
    }

    // Special cases
    matches!(addr, "localhost" | "::" | "::0" | "0.0.0.0")
}

/// Validates the configuration against rules that aren't covered by the JSON schema.
///
/// The schema already bounds most fields; these checks repeat the important ones
/// so a `Config` built in code gets the same treatment as one read from disk.
///
/// # Validation Rules
///
/// - **Port Range**: the Modbus port must be within 1-65534
/// - **Address Format**: a non-IP address is only reported at debug level
/// - **Tick Interval**: the simulation interval must be greater than zero
/// - **Device Defaults**: the fan mode must be 0, 1 or 2 and the simulation flag 0 or 1
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    if config.modbus.port < 1 || config.modbus.port > 65534 {
        anyhow::bail!("Invalid Modbus port number: {}", config.modbus.port);
    }

    if !is_valid_ip_address(&config.modbus.address) {
        // Hostnames are accepted, the bind will fail later if they do not resolve
        debug!(
            "Potentially invalid address format: {}",
            config.modbus.address
        );
    }

    if config.simulation.interval_ms == 0 {
        anyhow::bail!("Simulation interval must be greater than 0 ms");
    }

    if config.device.fan_mode > 2 {
        anyhow::bail!(
            "Invalid default fan mode: {} (expected 0, 1 or 2)",
            config.device.fan_mode
        );
    }

    if config.device.sim_enable > 1 {
        anyhow::bail!(
            "Invalid default simulation flag: {} (expected 0 or 1)",
            config.device.sim_enable
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_address_validation() {
        assert!(is_valid_ip_address("127.0.0.1"));
        assert!(is_valid_ip_address("::1"));
        assert!(is_valid_ip_address("localhost"));
        assert!(!is_valid_ip_address("not an address"));
    }

    #[test]
    fn test_specific_rules() {
        let mut config = Config::default();
        assert!(validate_specific_rules(&config).is_ok());

        config.simulation.interval_ms = 0;
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.device.fan_mode = 3;
        assert!(validate_specific_rules(&config).is_err());

        let mut config = Config::default();
        config.modbus.port = 65535;
        assert!(validate_specific_rules(&config).is_err());
    }

    #[test]
    fn test_embedded_schema_parses() {
        let schema = config_schema().unwrap();
        assert_eq!(schema["type"], "object");
    }
}
