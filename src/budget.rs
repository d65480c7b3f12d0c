// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Planned and executed revenue/expense lines kept in a budget CSV.

use crate::error::{Error, Result};
use crate::value::{ValueRule, parse_value};
use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    Revenue,
    Expense,
}

impl FromStr for EntryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Revenue" => Ok(EntryKind::Revenue),
            "Expense" => Ok(EntryKind::Expense),
            other => Err(Error::InvalidField {
                field: "Type",
                value: other.to_string(),
                line: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Prospected,
    Expected,
    Executed,
    Cancelled,
}

impl Status {
    /// Whether the line counts towards totals.
    pub fn is_committed(self) -> bool {
        !matches!(self, Status::Prospected | Status::Cancelled)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Prospected => "Prospected",
            Status::Expected => "Expected",
            Status::Executed => "Executed",
            Status::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Prospected" => Ok(Status::Prospected),
            "Expected" => Ok(Status::Expected),
            "Executed" => Ok(Status::Executed),
            "Cancelled" => Ok(Status::Cancelled),
            other => Err(Error::InvalidField {
                field: "Status",
                value: other.to_string(),
                line: None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub kind: EntryKind,
    pub status: Status,
    pub contract: String,
    pub name: String,
    /// Magnitude; the sign comes from `kind`.
    pub value: Decimal,
    pub date_due: Option<NaiveDate>,
    pub date_exe: Option<NaiveDate>,
    pub tags: String,
    pub method: String,
    pub protocol: String,
    pub file_receipt: String,
    pub file_invoice: String,
    pub file_nf: String,
    pub freq: Option<String>,
}

impl BudgetEntry {
    pub fn signed_value(&self) -> Decimal {
        match self.kind {
            EntryKind::Revenue => self.value,
            EntryKind::Expense => -self.value,
        }
    }
}

pub const BUDGET_COLUMNS: [&str; 14] = [
    "Type",
    "Status",
    "Contract",
    "Name",
    "Value",
    "Date_Due",
    "Date_Exe",
    "Tags",
    "Method",
    "Protocol",
    "File_Receipt",
    "File_Invoice",
    "File_NF",
    "Freq",
];

fn parse_opt_date(raw: &str, line: usize) -> Result<Option<NaiveDate>> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }
    // Timestamps such as `2025-03-10 00:00:00` keep only the date part.
    let day = s.split([' ', 'T']).next().unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::DateFormat {
            value: s.to_string(),
            line: Some(line),
            expected: "YYYY-MM-DD",
        })
}

/// Load a `;`-separated budget table. Only the first five columns are required.
pub fn load_budget<R: Read>(rdr: R, delimiter: u8) -> Result<Vec<BudgetEntry>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);
    let headers = rdr.headers()?.clone();
    let idx = |name: &str| headers.iter().position(|h| h == name);
    for required in &BUDGET_COLUMNS[..5] {
        if idx(*required).is_none() {
            return Err(Error::Schema {
                column: required.to_string(),
                legacy: Vec::new(),
            });
        }
    }
    let cols: Vec<Option<usize>> = BUDGET_COLUMNS.iter().map(|c| idx(*c)).collect();

    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let line = i + 2;
        let get = |k: usize| cols[k].and_then(|j| rec.get(j)).unwrap_or("").to_string();
        let kind = get(0).parse::<EntryKind>().map_err(|e| e.at_line(line))?;
        let status = get(1).parse::<Status>().map_err(|e| e.at_line(line))?;
        let value = parse_value(&get(4), ValueRule::CommaDecimal).map_err(|e| e.at_line(line))?;
        let freq = get(13);
        out.push(BudgetEntry {
            kind,
            status,
            contract: get(2),
            name: get(3),
            value,
            date_due: parse_opt_date(&get(5), line)?,
            date_exe: parse_opt_date(&get(6), line)?,
            tags: get(7),
            method: get(8),
            protocol: get(9),
            file_receipt: get(10),
            file_invoice: get(11),
            file_nf: get(12),
            freq: (!freq.is_empty()).then_some(freq),
        });
    }
    debug!(entries = out.len(), "loaded budget");
    Ok(out)
}

fn opt_date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Write entries back in the same column layout [`load_budget`] reads.
pub fn write_budget<W: Write>(w: W, entries: &[BudgetEntry], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(w);
    wtr.write_record(BUDGET_COLUMNS)?;
    for e in entries {
        let kind = match e.kind {
            EntryKind::Revenue => "Revenue",
            EntryKind::Expense => "Expense",
        };
        wtr.write_record([
            kind.to_string(),
            e.status.to_string(),
            e.contract.clone(),
            e.name.clone(),
            e.value.to_string(),
            opt_date(e.date_due),
            opt_date(e.date_exe),
            e.tags.clone(),
            e.method.clone(),
            e.protocol.clone(),
            e.file_receipt.clone(),
            e.file_invoice.clone(),
            e.file_nf.clone(),
            e.freq.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTotals {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

impl BudgetTotals {
    /// Group summaries list the largest amounts first when the budget is in
    /// surplus, the most negative first otherwise.
    pub fn ascending(&self) -> bool {
        self.net <= Decimal::ZERO
    }
}

fn selected(entries: &[BudgetEntry], committed_only: bool) -> impl Iterator<Item = &BudgetEntry> {
    entries
        .iter()
        .filter(move |e| !committed_only || e.status.is_committed())
}

/// Revenue, expenses (negative) and net. `committed_only` leaves out
/// prospected and cancelled lines.
pub fn totals(entries: &[BudgetEntry], committed_only: bool) -> BudgetTotals {
    let (mut revenue, mut expenses) = (Decimal::ZERO, Decimal::ZERO);
    for e in selected(entries, committed_only) {
        match e.kind {
            EntryKind::Revenue => revenue += e.signed_value(),
            EntryKind::Expense => expenses += e.signed_value(),
        }
    }
    BudgetTotals {
        revenue,
        expenses,
        net: revenue + expenses,
    }
}

fn summarize_by<F>(entries: &[BudgetEntry], committed_only: bool, key: F) -> Vec<(String, Decimal)>
where
    F: Fn(&BudgetEntry) -> String,
{
    let mut groups: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in selected(entries, committed_only) {
        *groups.entry(key(e)).or_default() += e.signed_value();
    }
    let mut rows: Vec<(String, Decimal)> = groups.into_iter().collect();
    if totals(entries, true).ascending() {
        rows.sort_by(|a, b| a.1.cmp(&b.1));
    } else {
        rows.sort_by(|a, b| b.1.cmp(&a.1));
    }
    rows
}

pub fn summary_by_status(entries: &[BudgetEntry], committed_only: bool) -> Vec<(String, Decimal)> {
    summarize_by(entries, committed_only, |e| e.status.to_string())
}

pub fn summary_by_contract(
    entries: &[BudgetEntry],
    committed_only: bool,
) -> Vec<(String, Decimal)> {
    summarize_by(entries, committed_only, |e| e.contract.clone())
}

/// Grouped by the whole tag string, as written in the file.
pub fn summary_by_tags(entries: &[BudgetEntry], committed_only: bool) -> Vec<(String, Decimal)> {
    summarize_by(entries, committed_only, |e| e.tags.clone())
}

/// Occurrences of each individual tag, most frequent first.
pub fn tag_counts(entries: &[BudgetEntry], committed_only: bool) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for e in selected(entries, committed_only) {
        for tag in e.tags.split_whitespace() {
            *counts.entry(tag).or_default() += 1;
        }
    }
    let mut rows: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(t, n)| (t.to_string(), n))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
}

/// Mark automatic debits as executed once their due date has passed.
pub fn update_status(entries: &[BudgetEntry], today: NaiveDate) -> Vec<BudgetEntry> {
    entries
        .iter()
        .map(|e| {
            let mut e = e.clone();
            let due = e.date_due.is_some_and(|d| d <= today);
            if e.method == "Automatic" && e.status == Status::Expected && due {
                e.status = Status::Executed;
            }
            e
        })
        .collect()
}

/// Recurrence codes accepted in the `Freq` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    Daily,
    /// Sundays.
    Weekly,
    MonthStart,
    MonthEnd,
    QuarterStart,
    QuarterEnd,
    YearStart,
    YearEnd,
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "D" => Ok(Frequency::Daily),
            "W" | "W-SUN" => Ok(Frequency::Weekly),
            "MS" => Ok(Frequency::MonthStart),
            "M" | "ME" => Ok(Frequency::MonthEnd),
            "QS" | "QS-JAN" => Ok(Frequency::QuarterStart),
            "Q" | "QE" | "Q-DEC" | "QE-DEC" => Ok(Frequency::QuarterEnd),
            "YS" | "AS" => Ok(Frequency::YearStart),
            "Y" | "YE" | "A" => Ok(Frequency::YearEnd),
            _ => Err(Error::Frequency(s.to_string())),
        }
    }
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

impl Frequency {
    /// Occurrences within `[year-01-01, year+1-01-01)`.
    pub fn dates(self, year: i32) -> Vec<NaiveDate> {
        let Some(start) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            return Vec::new();
        };
        let months = |step: usize, end: bool| -> Vec<NaiveDate> {
            (1..=12u32)
                .step_by(step)
                .filter_map(|m| {
                    if end {
                        month_end(year, m + step as u32 - 1)
                    } else {
                        NaiveDate::from_ymd_opt(year, m, 1)
                    }
                })
                .collect()
        };
        match self {
            Frequency::Daily => start
                .iter_days()
                .take_while(|d| d.year() == year)
                .collect(),
            Frequency::Weekly => {
                let offset = (7 - start.weekday().num_days_from_sunday()) % 7;
                let first = start + Duration::days(offset as i64);
                first
                    .iter_weeks()
                    .take_while(|d| d.year() == year)
                    .collect()
            }
            Frequency::MonthStart => months(1, false),
            Frequency::MonthEnd => months(1, true),
            Frequency::QuarterStart => months(3, false),
            Frequency::QuarterEnd => months(3, true),
            Frequency::YearStart => vec![start],
            Frequency::YearEnd => month_end(year, 12).into_iter().collect(),
        }
    }
}

/// One copy of `entry` per occurrence of `freq` in `year`, each with its own
/// due date.
pub fn expand(entry: &BudgetEntry, freq: Frequency, year: i32) -> Vec<BudgetEntry> {
    freq.dates(year)
        .into_iter()
        .map(|d| {
            let mut e = entry.clone();
            e.date_due = Some(d);
            e
        })
        .collect()
}

/// Expand every entry by its own `Freq` column; entries without one are kept
/// as they are.
pub fn expand_all(entries: &[BudgetEntry], year: i32) -> Result<Vec<BudgetEntry>> {
    let mut out = Vec::new();
    for e in entries {
        match e.freq.as_deref() {
            Some(code) => out.extend(expand(e, code.parse()?, year)),
            None => out.push(e.clone()),
        }
    }
    debug!(year, input = entries.len(), output = out.len(), "expanded budget");
    Ok(out)
}
