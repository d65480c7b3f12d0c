// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cashflow::{DEFAULT_CATEGORY, year_panel};
use crate::error::{Error, Result};
use crate::flow::{Flow, classify};
use crate::models::CanonicalRecord;
use crate::value::{ValueRule, format_cents, parse_value};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Granularity {
    Monthly,
    Daily,
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(Granularity::Monthly),
            "daily" | "day" | "d" => Ok(Granularity::Daily),
            other => Err(format!("unknown granularity: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    /// `YYYY-MM` for monthly panels, `YYYY-MM-DD` for daily ones.
    pub period: String,
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub net: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub year: i32,
    pub opening_balance: Decimal,
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub net: Decimal,
    pub closing_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowReport {
    pub panel: Vec<PanelRow>,
    pub summary: ReportSummary,
}

fn monthly_rows(records: &[CanonicalRecord], year: i32) -> Vec<(String, Decimal, Decimal)> {
    year_panel(&classify(records), year, DEFAULT_CATEGORY)
        .into_iter()
        .map(|b| (b.month, b.inflow, b.outflow))
        .collect()
}

fn daily_rows(records: &[CanonicalRecord], year: i32) -> Vec<(String, Decimal, Decimal)> {
    let mut by_day: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for r in records.iter().filter(|r| r.date.year() == year) {
        let day = by_day.entry(r.date).or_default();
        match Flow::of(r.value) {
            Flow::In => day.0 += r.value,
            Flow::Out => day.1 += r.value,
        }
    }
    by_day
        .into_iter()
        .map(|(d, (i, o))| (d.format("%Y-%m-%d").to_string(), i, o))
        .collect()
}

/// Running-balance panel and summary for one year.
///
/// Records outside `year` are ignored. Nothing is rounded here.
pub fn compose(
    records: &[CanonicalRecord],
    year: i32,
    opening_balance: Decimal,
    granularity: Granularity,
) -> CashflowReport {
    let rows = match granularity {
        Granularity::Monthly => monthly_rows(records, year),
        Granularity::Daily => daily_rows(records, year),
    };

    let mut balance = opening_balance;
    let (mut inflow, mut outflow) = (Decimal::ZERO, Decimal::ZERO);
    let panel: Vec<PanelRow> = rows
        .into_iter()
        .map(|(period, i, o)| {
            let net = i + o;
            balance += net;
            inflow += i;
            outflow += o;
            PanelRow {
                period,
                inflow: i,
                outflow: o,
                net,
                balance,
            }
        })
        .collect();

    let net = inflow + outflow;
    debug!(year, rows = panel.len(), %net, "composed cash-flow report");
    CashflowReport {
        panel,
        summary: ReportSummary {
            year,
            opening_balance,
            inflow,
            outflow,
            net,
            closing_balance: opening_balance + net,
        },
    }
}

/// Known opening balance per year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningBalances(BTreeMap<i32, Decimal>);

impl OpeningBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, balance: Decimal) {
        self.0.insert(year, balance);
    }

    /// Read a `Year;Value` table. `Amount` is accepted for the value column.
    pub fn from_reader<R: Read>(rdr: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(rdr);
        let headers = rdr.headers()?.clone();
        let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h));
        let year_idx = find(&["Year", "Ano"]).ok_or_else(|| Error::Schema {
            column: "Year".into(),
            legacy: vec!["Ano".into()],
        })?;
        let value_idx = find(&["Value", "Amount", "Valor"]).ok_or_else(|| Error::Schema {
            column: "Value".into(),
            legacy: vec!["Amount".into(), "Valor".into()],
        })?;

        let mut out = Self::new();
        for (i, rec) in rdr.records().enumerate() {
            let rec = rec?;
            let line = i + 2;
            let year_raw = rec.get(year_idx).unwrap_or_default();
            let year = year_raw.parse::<i32>().map_err(|_| Error::DateFormat {
                value: year_raw.to_string(),
                line: Some(line),
                expected: "YYYY",
            })?;
            let value = parse_value(rec.get(value_idx).unwrap_or_default(), ValueRule::CommaDecimal)
                .map_err(|e| e.at_line(line))?;
            out.insert(year, value);
        }
        Ok(out)
    }

    pub fn for_year(&self, year: i32) -> Result<Decimal> {
        self.0
            .get(&year)
            .copied()
            .ok_or(Error::MissingBalance { year })
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.keys().copied()
    }
}

pub const PANEL_HEADER: [&str; 5] = ["Periodo", "Entradas", "Saidas", "Fluxo", "Saldo"];

pub const SUMMARY_HEADER: [&str; 6] = [
    "Ano",
    "Saldo_Inicial",
    "Entradas",
    "Saidas",
    "Fluxo",
    "Saldo_Final",
];

pub fn write_panel<W: Write>(w: W, panel: &[PanelRow], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(w);
    wtr.write_record(PANEL_HEADER)?;
    for r in panel {
        wtr.write_record([
            r.period.clone(),
            format_cents(r.inflow),
            format_cents(r.outflow),
            format_cents(r.net),
            format_cents(r.balance),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_summary<W: Write>(w: W, s: &ReportSummary, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(w);
    wtr.write_record(SUMMARY_HEADER)?;
    wtr.write_record([
        s.year.to_string(),
        format_cents(s.opening_balance),
        format_cents(s.inflow),
        format_cents(s.outflow),
        format_cents(s.net),
        format_cents(s.closing_balance),
    ])?;
    wtr.flush()?;
    Ok(())
}
