// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::CanonicalRecord;
use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flow {
    In,
    Out,
}

impl Flow {
    /// Zero counts as an inflow.
    pub fn of(value: Decimal) -> Self {
        if value >= Decimal::ZERO {
            Flow::In
        } else {
            Flow::Out
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::In => f.write_str("In"),
            Flow::Out => f.write_str("Out"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub record: CanonicalRecord,
    pub year: i32,
    /// `YYYY-MM`
    pub month: String,
    pub flow: Flow,
}

pub fn month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

pub fn classify_one(record: &CanonicalRecord) -> ClassifiedRecord {
    ClassifiedRecord {
        year: record.date.year(),
        month: month_key(record.date.year(), record.date.month()),
        flow: Flow::of(record.value),
        record: record.clone(),
    }
}

pub fn classify(records: &[CanonicalRecord]) -> Vec<ClassifiedRecord> {
    records.iter().map(classify_one).collect()
}
