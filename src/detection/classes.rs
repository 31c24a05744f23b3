// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class id to label mapping

use std::collections::HashMap;

/// Label reported for class ids the table does not know about
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Read-only mapping from model class id to human-readable label.
///
/// Built once at startup and shared across requests.
#[derive(Debug, Clone)]
pub struct ClassNameTable {
    names: HashMap<u32, String>,
}

impl ClassNameTable {
    /// Build a table from explicit (id, label) pairs
    pub fn new(entries: &[(u32, &str)]) -> Self {
        let names = entries
            .iter()
            .map(|(id, label)| (*id, label.to_string()))
            .collect();
        Self { names }
    }

    /// The station-safety deployment table: fire extinguishers,
    /// tool boxes, oxygen tanks.
    pub fn station_safety() -> Self {
        Self::new(&[(0, "FireExtinguisher"), (1, "ToolBox"), (2, "OxygenTank")])
    }

    /// Look up a class id, falling back to [`UNKNOWN_LABEL`]
    pub fn name(&self, class_id: u32) -> &str {
        self.names
            .get(&class_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_LABEL)
    }

    /// Number of known classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for ClassNameTable {
    fn default() -> Self {
        Self::station_safety()
    }
}
