//! Provenance verdict from marker evidence

use serde::Serialize;

use crate::vocabulary::MarkerScan;

/// Generic markers needed before an unattributed signature counts as ours
const GENERIC_OWN_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SystemType {
    #[serde(rename = "Nuestro Sistema")]
    OwnSystem,
    #[serde(rename = "Otro Sistema")]
    ForeignSystem,
    #[serde(rename = "Sistema Desconocido")]
    UnknownSystem,
}

/// Own markers win over foreign ones. Without either, two or more distinct
/// generic markers are weak evidence for our own system.
pub fn classify(scan: &MarkerScan) -> SystemType {
    if !scan.own.is_empty() {
        SystemType::OwnSystem
    } else if !scan.foreign.is_empty() {
        SystemType::ForeignSystem
    } else if scan.generic_count() >= GENERIC_OWN_THRESHOLD {
        SystemType::OwnSystem
    } else {
        SystemType::UnknownSystem
    }
}
