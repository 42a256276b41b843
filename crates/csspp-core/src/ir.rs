//! The JSON asset IR written next to the generated CSS.

use serde::{Deserialize, Serialize};

use crate::assets::AssetMap;
use crate::error::Result;

pub const IR_VERSION: &str = "0.1.0";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub rules: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl Metadata {
    pub fn accumulate(&mut self, other: &Metadata) {
        self.rules += other.rules;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetIr {
    pub version: String,
    pub timestamp: String,
    pub assets: AssetMap,
    pub metadata: Metadata,
}

impl AssetIr {
    /// Stamps the IR with the current UTC time.
    pub fn new(assets: AssetMap, metadata: Metadata) -> Self {
        Self {
            version: IR_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            assets,
            metadata,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
