//! Ingress configuration.
//!
//! Lookup tables and constants used by the payload adapters and the pipeline.
//! All values are read-only once loaded and are passed explicitly to the code
//! that needs them.
//!
//! # Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. JSON file named by `INGRESS_CONFIG` (or `--config` on the CLI)
//! 3. Environment variables (a `.env` file is loaded first if present):
//!
//! | Variable                        | Field                  |
//! |---------------------------------|------------------------|
//! | `INGRESS_VEHICLE_ORDER_PREFIX`  | `vehicleOrderPrefix`   |
//! | `INGRESS_CONTRACT_ID`           | `contractId`           |
//! | `INGRESS_SOURCE_SYSTEM`         | `sourceSystem`         |
//! | `INGRESS_HEADER_PREFIX`         | `headerPrefix`         |
//! | `INGRESS_STATUS_OVERRIDES`      | `statusOverrides` (`5500=6000,...`) |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::transform::filter::DEFAULT_VEHICLE_ORDER_PREFIX;

/// Environment variable naming a JSON config file.
pub const CONFIG_PATH_VAR: &str = "INGRESS_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IngressConfig {
    /// Planned order id prefix of vehicle-level orders.
    pub vehicle_order_prefix: String,

    /// Value of the `<prefix>-Contract-ID` transport header.
    pub contract_id: String,

    /// Value of the `<prefix>-Source-System` transport header.
    pub source_system: String,

    /// Prefix of all transport header names.
    pub header_prefix: String,

    /// Build status rewrites applied to the vehicle attributes.
    pub status_overrides: BTreeMap<i64, i64>,

    /// Raw plant id to published plant code. Unmapped ids pass through.
    pub plant_codes: BTreeMap<String, String>,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            vehicle_order_prefix: DEFAULT_VEHICLE_ORDER_PREFIX.to_string(),
            contract_id: "PRIW".to_string(),
            source_system: "protonOxf".to_string(),
            header_prefix: "BMW-DVF".to_string(),
            status_overrides: BTreeMap::from([(5500, 6000)]),
            plant_codes: BTreeMap::new(),
        }
    }
}

impl IngressConfig {
    /// Load configuration from the process environment.
    pub fn load() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();

        let config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        config.with_overrides(|var| env::var(var).ok())
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Apply overrides from a variable lookup (usually the environment).
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("INGRESS_VEHICLE_ORDER_PREFIX") {
            self.vehicle_order_prefix = v;
        }
        if let Some(v) = lookup("INGRESS_CONTRACT_ID") {
            self.contract_id = v;
        }
        if let Some(v) = lookup("INGRESS_SOURCE_SYSTEM") {
            self.source_system = v;
        }
        if let Some(v) = lookup("INGRESS_HEADER_PREFIX") {
            self.header_prefix = v;
        }
        if let Some(v) = lookup("INGRESS_STATUS_OVERRIDES") {
            self.status_overrides = parse_status_overrides(&v)?;
        }
        Ok(self)
    }

    /// Published build status for a raw order status.
    pub fn build_status(&self, raw: i64) -> i64 {
        self.status_overrides.get(&raw).copied().unwrap_or(raw)
    }

    /// Published plant code for a raw plant id.
    pub fn plant_code(&self, raw: &str) -> String {
        self.plant_codes
            .get(raw)
            .cloned()
            .unwrap_or_else(|| raw.to_string())
    }
}

/// Parse `from=to` pairs separated by commas.
fn parse_status_overrides(value: &str) -> ConfigResult<BTreeMap<i64, i64>> {
    let invalid = |message: String| ConfigError::InvalidEnv {
        var: "INGRESS_STATUS_OVERRIDES".to_string(),
        message,
    };

    let mut overrides = BTreeMap::new();
    for pair in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (from, to) = pair
            .split_once('=')
            .ok_or_else(|| invalid(format!("expected 'from=to', got '{}'", pair)))?;
        let from: i64 = from
            .trim()
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a status code", from.trim())))?;
        let to: i64 = to
            .trim()
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a status code", to.trim())))?;
        overrides.insert(from, to);
    }
    Ok(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = IngressConfig::default();
        assert_eq!(config.vehicle_order_prefix, "VH_");
        assert_eq!(config.build_status(5500), 6000);
        assert_eq!(config.build_status(4000), 4000);
        assert_eq!(config.plant_code("0710"), "0710");
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "contractId": "TEST", "plantCodes": {{ "0710": "DGF" }} }}"#
        )
        .unwrap();

        let config = IngressConfig::from_file(file.path()).unwrap();

        assert_eq!(config.contract_id, "TEST");
        assert_eq!(config.source_system, "protonOxf");
        assert_eq!(config.plant_code("0710"), "DGF");
        assert_eq!(config.build_status(5500), 6000);
    }

    #[test]
    fn test_from_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = IngressConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("INGRESS_VEHICLE_ORDER_PREFIX", "VX_"),
            ("INGRESS_STATUS_OVERRIDES", "5500=6000, 7000=7100"),
        ]);

        let config = IngressConfig::default()
            .with_overrides(|var| vars.get(var).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.vehicle_order_prefix, "VX_");
        assert_eq!(config.build_status(7000), 7100);
        assert_eq!(config.contract_id, "PRIW");
    }

    #[test]
    fn test_invalid_status_override() {
        let err = IngressConfig::default()
            .with_overrides(|var| {
                (var == "INGRESS_STATUS_OVERRIDES").then(|| "5500:6000".to_string())
            })
            .unwrap_err();

        assert!(err.to_string().contains("INGRESS_STATUS_OVERRIDES"));
    }
}
