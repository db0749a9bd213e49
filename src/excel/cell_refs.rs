//! Name → address bookkeeping for formulas that point at earlier rows

use crate::error::{RoadmapError, RoadmapResult};
use crate::types::{PerformanceField, SettingsField, Stage, TargetField};
use std::collections::HashMap;
use std::fmt;

/// Cell that later formulas may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKey {
    Setting(SettingsField),
    Performance(PerformanceField),
    Target(TargetField),
    /// Exact (unrounded) requirement of a plan row
    Plan(Stage),
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKey::Setting(field) => write!(f, "programSettings.{}", field.key()),
            CellKey::Performance(field) => write!(f, "currentPerformance.{}", field.key()),
            CellKey::Target(field) => write!(f, "referenceTargets.{}", field.key()),
            CellKey::Plan(stage) => write!(f, "plan.{:?}", stage),
        }
    }
}

/// Zero-based cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellAddress {
    /// A1 notation
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_index_to_letter(self.col as usize), self.row + 1)
    }
}

/// Convert a 0-based column index to its letter (0 → A, 26 → AA)
pub fn column_index_to_letter(index: usize) -> String {
    let mut result = String::new();
    let mut idx = index;

    loop {
        let remainder = idx % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }

    result
}

/// Per-sheet table, filled in as rows are written
#[derive(Debug, Default)]
pub struct CellRefs {
    refs: HashMap<CellKey, CellAddress>,
}

impl CellRefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: CellKey, address: CellAddress) {
        self.refs.insert(key, address);
    }

    /// A1 address of `key`; referencing a cell not yet written is an error
    pub fn get(&self, key: CellKey) -> RoadmapResult<String> {
        self.refs
            .get(&key)
            .map(|address| address.to_string())
            .ok_or_else(|| {
                RoadmapError::Export(format!("cell reference '{}' used before it was written", key))
            })
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}
