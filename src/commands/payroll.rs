// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::payroll::{inss, irrf};
use crate::utils::{fmt_money, maybe_print_json, money_table, required};
use crate::value::{ValueRule, parse_value};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Withholding {
    pub gross: Decimal,
    pub inss: Decimal,
    /// Gross minus INSS.
    pub irrf_base: Decimal,
    pub irrf: Decimal,
    pub net: Decimal,
}

pub fn withholding(gross: Decimal) -> Withholding {
    let inss = inss(gross);
    let irrf_base = gross - inss;
    let irrf = irrf(irrf_base);
    Withholding {
        gross,
        inss,
        irrf_base,
        irrf,
        net: irrf_base - irrf,
    }
}

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let raw = required(m, "gross")?;
    let gross = parse_value(raw, ValueRule::CommaDecimal)
        .with_context(|| format!("Invalid gross salary '{}'", raw))?;
    let w = withholding(gross);
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &w)? {
        return Ok(());
    }
    println!(
        "{}",
        money_table(
            &["Gross", "INSS", "IRRF base", "IRRF", "Net"],
            vec![vec![
                fmt_money(&w.gross),
                fmt_money(&w.inss),
                fmt_money(&w.irrf_base),
                fmt_money(&w.irrf),
                fmt_money(&w.net),
            ]],
            0,
        )
    );
    Ok(())
}
