// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Run-level diagnostics collection
//!
//! Recoverable failures (an OCR region that errored, a swatch the
//! classifier could not label) are collected as diagnostics and returned
//! alongside the final report instead of being thrown. Only a failure to
//! load the plan image itself is fatal.

use serde::{Deserialize, Serialize};

/// Pipeline stage a diagnostic originated from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Stage {
    ScaleCalibration,
    LegendSegmentation,
    PatternClassification,
    PatternMatching,
    AnnotationExtraction,
    Aggregation,
}

/// One recoverable warning produced during a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
}

/// Ordered collection of diagnostics for a single pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            stage,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut diags = Diagnostics::new();
        diags.warn(Stage::ScaleCalibration, "no scale text found");
        diags.warn(Stage::PatternClassification, "swatch 2 skipped");

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.entries()[0].stage, Stage::ScaleCalibration);
        assert_eq!(diags.entries()[1].stage, Stage::PatternClassification);
    }
}
