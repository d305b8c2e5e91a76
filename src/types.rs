// src/types.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One certificate scraped from the DIO profile page.
///
/// Wire field names (`titulo`, `data`) match the JSON data file produced
/// by earlier versions of this tooling, so existing files keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(rename = "titulo")]
    pub title: String,
    pub url: String,
    #[serde(rename = "data")]
    pub date: String,
}

/// Snapshot of a single fetch run, persisted as `dio-data.json`.
///
/// The file is fully replaced on every run; cumulative state lives in the
/// resume HTML itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub certificates: Vec<Certificate>,
    pub skills: BTreeMap<String, u32>,
    pub last_update: String,
}

impl RunResult {
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty() && self.skills.is_empty()
    }
}
