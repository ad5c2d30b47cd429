// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for vision pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during a takeoff run
///
/// Only `ImageLoad` is fatal to a run. OCR and classifier failures are
/// recoverable: the pipeline catches them per region/swatch, records a
/// diagnostic and continues.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Cannot load plan image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("OCR engine failure: {0}")]
    Ocr(String),

    #[error("Classifier failure: {0}")]
    Classifier(String),

    #[error("Core error: {0}")]
    Core(#[from] takeoff_core::Error),
}
