// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Error type shared by the statement, cash-flow and invoice modules.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expected column '{column}' (or legacy {legacy:?}) not found in statement")]
    Schema {
        column: String,
        legacy: Vec<String>,
    },

    #[error("Invalid date '{value}'{}, expected {expected}", at(.line))]
    DateFormat {
        value: String,
        line: Option<usize>,
        expected: &'static str,
    },

    #[error("Invalid value '{value}'{}", at(.line))]
    ValueFormat { value: String, line: Option<usize> },

    #[error("Invalid {field} '{value}'{}", at(.line))]
    InvalidField {
        field: &'static str,
        value: String,
        line: Option<usize>,
    },

    #[error("No opening balance available for year {year}")]
    MissingBalance { year: i32 },

    #[error("Unknown statement type '{0}' (use bb-cc|bb-ccpj|bb-pp|none)")]
    UnknownVariant(String),

    #[error("Unknown frequency code '{0}'")]
    Frequency(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Missing element '{0}' in invoice")]
    MissingElement(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

fn at(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" on line {}", n),
        None => String::new(),
    }
}

impl Error {
    /// Attach the CSV line number to a value, date or field error.
    pub fn at_line(self, n: usize) -> Self {
        match self {
            Error::ValueFormat { value, .. } => Error::ValueFormat {
                value,
                line: Some(n),
            },
            Error::DateFormat {
                value, expected, ..
            } => Error::DateFormat {
                value,
                line: Some(n),
                expected,
            },
            Error::InvalidField { field, value, .. } => Error::InvalidField {
                field,
                value,
                line: Some(n),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
