//! Parameter overrides loaded from a JSON object such as
//! `{ "lightIntensity": 3.0, "lightColor": "#ffcc00" }`.

use crate::{ParamError, ParamStore, ParamValue};
use std::collections::BTreeMap;
use std::path::Path;

/// Parse an overrides document.
pub fn parse_overrides(json: &str) -> Result<BTreeMap<String, ParamValue>, ParamError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse an overrides file.
pub fn load_overrides(path: impl AsRef<Path>) -> Result<BTreeMap<String, ParamValue>, ParamError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_overrides(&text)
}

impl ParamStore {
    /// Apply overrides through [`ParamStore::set`], so range constraints still hold.
    /// Stops at the first rejected entry.
    pub fn apply_overrides(
        &mut self,
        overrides: &BTreeMap<String, ParamValue>,
    ) -> Result<usize, ParamError> {
        for (name, value) in overrides {
            self.set(name, *value)?;
        }
        tracing::info!(count = overrides.len(), "parameter overrides applied");
        Ok(overrides.len())
    }
}
