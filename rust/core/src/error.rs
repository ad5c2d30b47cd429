// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core takeoff operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating takeoff configuration or inputs
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid similarity weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid scale notation: {0}")]
    InvalidScale(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
