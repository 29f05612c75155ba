//! Transport headers of the outgoing message.

use std::collections::BTreeMap;

use crate::config::IngressConfig;

/// Header name to value, sorted by name.
pub type TransportHeaders = BTreeMap<String, String>;

/// Build the transport headers for one produced document.
///
/// `tracking` is the upstream tracking string; callers without one pass a fresh id.
pub fn build_headers(config: &IngressConfig, tracking: &str) -> TransportHeaders {
    let prefix = &config.header_prefix;
    BTreeMap::from([
        (format!("{}-Contract-ID", prefix), config.contract_id.clone()),
        (format!("{}-Source-System", prefix), config.source_system.clone()),
        (format!("{}-Source-Tracking-String", prefix), tracking.to_string()),
    ])
}
