// SPDX-FileCopyrightText: 2026 Fibrestock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic error type for configuration loading and validation.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration error suitable for miette rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A semantic constraint on a configuration value failed.
    #[error("{message}")]
    #[diagnostic(
        code(fibrestock::config::invalid_value),
        help("fix the value in fibrestock.toml or the corresponding FIBRESTOCK_ variable")
    )]
    Validation {
        /// Description of the violated constraint.
        message: String,
    },

    /// Figment failed to read or deserialize the configuration.
    #[error("failed to load configuration: {0}")]
    #[diagnostic(code(fibrestock::config::parse))]
    Parse(#[from] figment::Error),
}

/// Render collected errors to stderr as miette reports.
pub fn render_errors(errors: Vec<ConfigError>) {
    for error in errors {
        eprintln!("{:?}", miette::Report::new(error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_carry_the_message() {
        let err = ConfigError::Validation {
            message: "storage.database_path must not be empty".into(),
        };
        assert_eq!(err.to_string(), "storage.database_path must not be empty");
    }
}
