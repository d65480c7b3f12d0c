// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Raw statement tables and their normalization into canonical records.
//!
//! Every bank product is a [`StatementVariant`] value: which headers it uses
//! (and their legacy spellings), which administrative rows it drops, and how
//! its value column encodes direction. Adding a product means adding a
//! constant here.

use crate::error::{Error, Result};
use crate::models::{
    COL_CATEGORY, COL_DATE, COL_DESCRIPTION, COL_DETAILS, COL_DOCUMENT, COL_LABEL, COL_VALUE,
    CanonicalRecord, PRIORITY_COLUMNS,
};
use crate::value::{ValueRule, parse_value};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use encoding_rs::WINDOWS_1252;
use std::io::Write;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub cells: Vec<String>,
}

/// A statement as exported: named columns, every cell still text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, cells)| RawRow { line: i + 2, cells })
            .collect();
        Self { headers, rows }
    }

    pub fn from_csv_text(text: &str, delimiter: u8) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let rec = result?;
            let line = rec.position().map_or(rows.len() + 2, |p| p.line() as usize);
            rows.push(RawRow {
                line,
                cells: rec.iter().map(|c| c.to_string()).collect(),
            });
        }
        Ok(Self { headers, rows })
    }

    pub fn from_bytes(bytes: &[u8], delimiter: u8) -> Result<Self> {
        Self::from_csv_text(&decode_text(bytes), delimiter)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Decode statement bytes: strict UTF-8 first, Windows-1252 once as fallback.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(err) => {
            warn!(%err, "statement is not UTF-8, decoding as windows-1252");
            let (decoded, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            decoded.into_owned()
        }
    }
}

/// Predicate selecting administrative or noise rows to discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    Label(&'static str),
    RawValue(&'static str),
}

impl RowFilter {
    fn matches(&self, label: &str, raw_value: &str) -> bool {
        match self {
            RowFilter::Label(l) => label == *l,
            RowFilter::RawValue(v) => raw_value == *v,
        }
    }
}

/// Which passthrough columns survive into canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Label, details and document always present (empty when absent).
    Full,
    /// Date, value, category and description only.
    Compact,
    /// Keep passthrough columns only when the input has them.
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub date: &'static str,
    pub value: &'static str,
    pub label: Option<&'static str>,
    pub details: Option<&'static str>,
    pub document: Option<&'static str>,
    pub category: Option<&'static str>,
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementVariant {
    pub key: &'static str,
    /// Field separator of the exported file.
    pub delimiter: u8,
    /// `(legacy, current)` header pairs.
    pub aliases: &'static [(&'static str, &'static str)],
    pub columns: Columns,
    pub label_required: bool,
    pub drops: &'static [RowFilter],
    pub value_rule: ValueRule,
    pub date_format: &'static str,
    pub date_pattern: &'static str,
    pub layout: Layout,
}

const BB_ALIASES: &[(&str, &str)] = &[
    ("Histórico", "Lançamento"),
    ("Número do documento", "N° documento"),
];

const BB_CHECKING_COLUMNS: Columns = Columns {
    date: "Data",
    value: "Valor",
    label: Some("Lançamento"),
    details: Some("Detalhes"),
    document: Some("N° documento"),
    category: None,
    description: None,
};

const BALANCE_MARKERS: &[RowFilter] = &[
    RowFilter::Label("Saldo do dia"),
    RowFilter::Label("Saldo Anterior"),
    RowFilter::Label("S A L D O"),
];

const BALANCE_MARKERS_AND_SWEEP: &[RowFilter] = &[
    RowFilter::Label("Saldo do dia"),
    RowFilter::Label("Saldo Anterior"),
    RowFilter::Label("S A L D O"),
    RowFilter::Label("BB Rende Fácil"),
    RowFilter::RawValue("0,00 C"),
];

pub const CHECKING_PERSONAL: StatementVariant = StatementVariant {
    key: "bb-cc",
    delimiter: b',',
    aliases: BB_ALIASES,
    columns: BB_CHECKING_COLUMNS,
    label_required: true,
    drops: BALANCE_MARKERS,
    value_rule: ValueRule::CommaDecimal,
    date_format: "%d/%m/%Y",
    date_pattern: "DD/MM/YYYY",
    layout: Layout::Full,
};

pub const CHECKING_LEGAL_ENTITY: StatementVariant = StatementVariant {
    key: "bb-ccpj",
    delimiter: b',',
    aliases: BB_ALIASES,
    columns: BB_CHECKING_COLUMNS,
    label_required: true,
    drops: BALANCE_MARKERS_AND_SWEEP,
    value_rule: ValueRule::DirectionMarker,
    date_format: "%d/%m/%Y",
    date_pattern: "DD/MM/YYYY",
    layout: Layout::Full,
};

pub const SAVINGS: StatementVariant = StatementVariant {
    key: "bb-pp",
    delimiter: b',',
    aliases: &[],
    columns: Columns {
        date: "Data",
        value: "Valor",
        label: Some("Histórico"),
        details: None,
        document: None,
        category: Some("Histórico"),
        description: None,
    },
    label_required: true,
    drops: &[],
    value_rule: ValueRule::DirectionMarker,
    date_format: "%d/%m/%Y",
    date_pattern: "DD/MM/YYYY",
    layout: Layout::Compact,
};

/// Tier 1 files written by this crate.
pub const CANONICAL: StatementVariant = StatementVariant {
    key: "none",
    delimiter: b';',
    aliases: &[],
    columns: Columns {
        date: COL_DATE,
        value: COL_VALUE,
        label: Some(COL_LABEL),
        details: Some(COL_DETAILS),
        document: Some(COL_DOCUMENT),
        category: Some(COL_CATEGORY),
        description: Some(COL_DESCRIPTION),
    },
    label_required: false,
    drops: &[],
    value_rule: ValueRule::CommaDecimal,
    date_format: "%Y-%m-%d",
    date_pattern: "YYYY-MM-DD",
    layout: Layout::Passthrough,
};

pub const VARIANTS: [StatementVariant; 4] =
    [CHECKING_PERSONAL, CHECKING_LEGAL_ENTITY, SAVINGS, CANONICAL];

pub fn variant_for(key: &str) -> Result<StatementVariant> {
    let k = key.trim().to_lowercase();
    VARIANTS
        .iter()
        .find(|v| v.key == k)
        .copied()
        .ok_or_else(|| Error::UnknownVariant(key.to_string()))
}

fn resolve_aliases(headers: &[String], aliases: &[(&str, &str)]) -> Vec<String> {
    let mut out = headers.to_vec();
    for (legacy, current) in aliases {
        if out.iter().any(|h| h == current) {
            continue;
        }
        if let Some(h) = out.iter_mut().find(|h| h == legacy) {
            *h = current.to_string();
        }
    }
    out
}

fn schema_error(column: &str, aliases: &[(&str, &str)]) -> Error {
    Error::Schema {
        column: column.to_string(),
        legacy: aliases
            .iter()
            .filter(|(_, current)| *current == column)
            .map(|(legacy, _)| legacy.to_string())
            .collect(),
    }
}

fn cell_at(row: &RawRow, idx: Option<usize>) -> &str {
    idx.and_then(|j| row.cells.get(j))
        .map(|s| s.trim())
        .unwrap_or("")
}

/// Map a raw statement onto canonical records, preserving row order.
///
/// Dropped rows never reach date or value parsing. Any unparseable date or
/// value aborts the whole call.
pub fn normalize(raw: &RawTable, variant: &StatementVariant) -> Result<Vec<CanonicalRecord>> {
    let headers = resolve_aliases(&raw.headers, variant.aliases);
    let find = |name: &str| headers.iter().position(|h| h == name);
    let cols = &variant.columns;

    let label_idx = cols.label.and_then(|c| find(c));
    if variant.label_required && label_idx.is_none() {
        let column = cols.label.unwrap_or_default();
        return Err(schema_error(column, variant.aliases));
    }
    let date_idx = find(cols.date).ok_or_else(|| schema_error(cols.date, variant.aliases))?;
    let value_idx = find(cols.value).ok_or_else(|| schema_error(cols.value, variant.aliases))?;
    let details_idx = cols.details.and_then(|c| find(c));
    let document_idx = cols.document.and_then(|c| find(c));
    let category_idx = cols.category.and_then(|c| find(c));
    let description_idx = cols.description.and_then(|c| find(c));

    let mut out = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;
    for row in &raw.rows {
        let cell = |idx: Option<usize>| cell_at(row, idx);
        let label = cell(label_idx);
        let raw_value = cell(Some(value_idx));
        if variant.drops.iter().any(|f| f.matches(label, raw_value)) {
            dropped += 1;
            continue;
        }

        let date_raw = cell(Some(date_idx));
        let date = NaiveDate::parse_from_str(date_raw, variant.date_format).map_err(|_| {
            Error::DateFormat {
                value: date_raw.to_string(),
                line: Some(row.line),
                expected: variant.date_pattern,
            }
        })?;
        let value = parse_value(raw_value, variant.value_rule).map_err(|e| e.at_line(row.line))?;

        let passthrough = |idx: Option<usize>| match variant.layout {
            Layout::Full => Some(cell(idx).to_string()),
            Layout::Compact => None,
            Layout::Passthrough => idx.map(|_| cell(idx).to_string()),
        };

        out.push(CanonicalRecord {
            date,
            value,
            category: cell(category_idx).to_string(),
            description: cell(description_idx).to_string(),
            label: passthrough(label_idx),
            details: passthrough(details_idx),
            document: passthrough(document_idx),
        });
    }

    debug!(
        variant = variant.key,
        rows = raw.len(),
        dropped,
        kept = out.len(),
        "normalized statement"
    );
    Ok(out)
}

/// Read a Tier 1 file previously written with [`write_canonical`].
pub fn read_canonical(bytes: &[u8], delimiter: u8) -> Result<Vec<CanonicalRecord>> {
    let raw = RawTable::from_bytes(bytes, delimiter)?;
    normalize(&raw, &CANONICAL)
}

/// Concatenate record sets in the order given.
pub fn concat<I>(parts: I) -> Vec<CanonicalRecord>
where
    I: IntoIterator<Item = Vec<CanonicalRecord>>,
{
    parts.into_iter().flatten().collect()
}

/// Header for a set of records: priority columns, then passthrough columns
/// that at least one record carries.
pub fn canonical_header(records: &[CanonicalRecord]) -> Vec<&'static str> {
    let mut header = PRIORITY_COLUMNS.to_vec();
    if records.iter().any(|r| r.label.is_some()) {
        header.push(COL_LABEL);
    }
    if records.iter().any(|r| r.details.is_some()) {
        header.push(COL_DETAILS);
    }
    if records.iter().any(|r| r.document.is_some()) {
        header.push(COL_DOCUMENT);
    }
    header
}

/// Write records at full precision. Dates are ISO formatted.
pub fn write_canonical<W: Write>(w: W, records: &[CanonicalRecord], delimiter: u8) -> Result<()> {
    let header = canonical_header(records);
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(w);
    wtr.write_record(&header)?;
    for r in records {
        let mut row = vec![
            r.date.format("%Y-%m-%d").to_string(),
            r.value.to_string(),
            r.category.clone(),
            r.description.clone(),
        ];
        for col in &header[PRIORITY_COLUMNS.len()..] {
            let v = match *col {
                COL_LABEL => r.label.as_deref(),
                COL_DETAILS => r.details.as_deref(),
                _ => r.document.as_deref(),
            };
            row.push(v.unwrap_or_default().to_string());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
