// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly and yearly cash-flow panels.
//!
//! Monthly cumulative columns restart every January; yearly cumulative
//! columns run over the whole history and never restart.

use crate::error::Result;
use crate::flow::{ClassifiedRecord, Flow, classify, month_key};
use crate::models::CanonicalRecord;
use crate::value::format_cents;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use tracing::debug;

/// Label used when no category filter is applied.
pub const DEFAULT_CATEGORY: &str = "Geral";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: String,
    pub category: String,
    pub inflow: Decimal,
    pub inflow_count: usize,
    pub outflow: Decimal,
    pub outflow_count: usize,
    pub net: Decimal,
    pub inflow_cum: Decimal,
    pub outflow_cum: Decimal,
    pub net_cum: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyBucket {
    pub year: i32,
    pub category: String,
    pub inflow: Decimal,
    pub inflow_count: usize,
    pub outflow: Decimal,
    pub outflow_count: usize,
    pub net: Decimal,
    pub inflow_cum: Decimal,
    pub outflow_cum: Decimal,
    pub net_cum: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowAnalysis {
    pub category: String,
    pub monthly: Vec<MonthlyBucket>,
    pub yearly: Vec<YearlyBucket>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Totals {
    inflow: Decimal,
    inflow_count: usize,
    outflow: Decimal,
    outflow_count: usize,
}

impl Totals {
    fn add(&mut self, r: &ClassifiedRecord) {
        match r.flow {
            Flow::In => {
                self.inflow += r.record.value;
                self.inflow_count += 1;
            }
            Flow::Out => {
                self.outflow += r.record.value;
                self.outflow_count += 1;
            }
        }
    }
}

/// Select records of one category, or keep all of them under [`DEFAULT_CATEGORY`].
pub fn filter_category(
    records: &[ClassifiedRecord],
    category: Option<&str>,
) -> (Vec<ClassifiedRecord>, String) {
    match category {
        None => (records.to_vec(), DEFAULT_CATEGORY.to_string()),
        Some(c) => (
            records
                .iter()
                .filter(|r| r.record.category == c)
                .cloned()
                .collect(),
            c.to_string(),
        ),
    }
}

fn month_totals(records: &[ClassifiedRecord]) -> HashMap<&str, Totals> {
    let mut by_month: HashMap<&str, Totals> = HashMap::new();
    for r in records {
        by_month.entry(r.month.as_str()).or_default().add(r);
    }
    by_month
}

fn scaffold_year(
    year: i32,
    category: &str,
    by_month: &HashMap<&str, Totals>,
) -> Vec<MonthlyBucket> {
    let mut out = Vec::with_capacity(12);
    let (mut inflow_cum, mut outflow_cum, mut net_cum) =
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    for m in 1..=12 {
        let month = month_key(year, m);
        let t = by_month.get(month.as_str()).copied().unwrap_or_default();
        let net = t.inflow + t.outflow;
        inflow_cum += t.inflow;
        outflow_cum += t.outflow;
        net_cum += net;
        out.push(MonthlyBucket {
            year,
            month,
            category: category.to_string(),
            inflow: t.inflow,
            inflow_count: t.inflow_count,
            outflow: t.outflow,
            outflow_count: t.outflow_count,
            net,
            inflow_cum,
            outflow_cum,
            net_cum,
        });
    }
    out
}

/// The twelve buckets of a single year, zero-filled where there is no activity.
pub fn year_panel(records: &[ClassifiedRecord], year: i32, category: &str) -> Vec<MonthlyBucket> {
    let in_year: Vec<ClassifiedRecord> =
        records.iter().filter(|r| r.year == year).cloned().collect();
    scaffold_year(year, category, &month_totals(&in_year))
}

/// Twelve buckets for every year between the earliest and latest record.
pub fn monthly(records: &[ClassifiedRecord], category: &str) -> Vec<MonthlyBucket> {
    let years = records.iter().map(|r| r.year);
    let (Some(first), Some(last)) = (years.clone().min(), years.max()) else {
        return Vec::new();
    };
    let by_month = month_totals(records);
    let mut out = Vec::with_capacity(12 * (last - first + 1) as usize);
    for year in first..=last {
        out.extend(scaffold_year(year, category, &by_month));
    }
    out
}

pub fn yearly(monthly: &[MonthlyBucket]) -> Vec<YearlyBucket> {
    let mut by_year: BTreeMap<i32, (String, Totals, Decimal)> = BTreeMap::new();
    for b in monthly {
        let entry = by_year
            .entry(b.year)
            .or_insert_with(|| (b.category.clone(), Totals::default(), Decimal::ZERO));
        entry.1.inflow += b.inflow;
        entry.1.inflow_count += b.inflow_count;
        entry.1.outflow += b.outflow;
        entry.1.outflow_count += b.outflow_count;
        entry.2 += b.net;
    }

    let (mut inflow_cum, mut outflow_cum, mut net_cum) =
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    by_year
        .into_iter()
        .map(|(year, (category, t, net))| {
            inflow_cum += t.inflow;
            outflow_cum += t.outflow;
            net_cum += net;
            YearlyBucket {
                year,
                category,
                inflow: t.inflow,
                inflow_count: t.inflow_count,
                outflow: t.outflow,
                outflow_count: t.outflow_count,
                net,
                inflow_cum,
                outflow_cum,
                net_cum,
            }
        })
        .collect()
}

/// Classify, filter, then build the monthly and yearly panels.
pub fn analyse(records: &[CanonicalRecord], category: Option<&str>) -> CashflowAnalysis {
    let classified = classify(records);
    let (selected, label) = filter_category(&classified, category);
    let monthly = monthly(&selected, &label);
    let yearly = yearly(&monthly);
    debug!(
        category = %label,
        records = selected.len(),
        months = monthly.len(),
        years = yearly.len(),
        "cash-flow analysis"
    );
    CashflowAnalysis {
        category: label,
        monthly,
        yearly,
    }
}

pub const MONTHLY_HEADER: [&str; 11] = [
    "Ano",
    "Mes",
    "Categoria",
    "Entradas",
    "Entradas_N",
    "Saidas",
    "Saidas_N",
    "Fluxo",
    "Entradas_Acum",
    "Saidas_Acum",
    "Fluxo_Acum",
];

pub const YEARLY_HEADER: [&str; 10] = [
    "Ano",
    "Categoria",
    "Entradas",
    "Entradas_N",
    "Saidas",
    "Saidas_N",
    "Fluxo",
    "Entradas_Acum",
    "Saidas_Acum",
    "Fluxo_Acum",
];

/// Monthly panel as CSV, money rounded to cents.
pub fn write_monthly<W: Write>(w: W, rows: &[MonthlyBucket], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(w);
    wtr.write_record(MONTHLY_HEADER)?;
    for b in rows {
        wtr.write_record([
            b.year.to_string(),
            b.month.clone(),
            b.category.clone(),
            format_cents(b.inflow),
            b.inflow_count.to_string(),
            format_cents(b.outflow),
            b.outflow_count.to_string(),
            format_cents(b.net),
            format_cents(b.inflow_cum),
            format_cents(b.outflow_cum),
            format_cents(b.net_cum),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_yearly<W: Write>(w: W, rows: &[YearlyBucket], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(delimiter).from_writer(w);
    wtr.write_record(YEARLY_HEADER)?;
    for b in rows {
        wtr.write_record([
            b.year.to_string(),
            b.category.clone(),
            format_cents(b.inflow),
            b.inflow_count.to_string(),
            format_cents(b.outflow),
            b.outflow_count.to_string(),
            format_cents(b.net),
            format_cents(b.inflow_cum),
            format_cents(b.outflow_cum),
            format_cents(b.net_cum),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
