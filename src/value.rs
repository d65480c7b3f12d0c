// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monetary text as exported by Brazilian banks.
//!
//! | Input        | `CommaDecimal` | `DirectionMarker` |
//! |--------------|----------------|-------------------|
//! | `5.000,00`   | `5000.00`      | `5000.00`         |
//! | `-403,00`    | `-403.00`      | `403.00`          |
//! | `5.000,00 C` | error          | `5000.00`         |
//! | `403,00 D`   | error          | `-403.00`         |

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

static MARKED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<amount>.*?)\s*(?P<marker>[CD])$").expect("marker regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueRule {
    /// Sign given by an explicit minus; `.` groups thousands when a `,` is present.
    CommaDecimal,
    /// Unsigned magnitude followed by a `C` (credit) or `D` (debit) marker.
    DirectionMarker,
}

pub fn parse_value(raw: &str, rule: ValueRule) -> Result<Decimal> {
    match rule {
        ValueRule::CommaDecimal => parse_comma_decimal(raw),
        ValueRule::DirectionMarker => parse_marked(raw),
    }
}

/// Parse a column of raw values; the output has the input's length and order.
pub fn parse_values<S: AsRef<str>>(raws: &[S], rule: ValueRule) -> Result<Vec<Decimal>> {
    raws.iter().map(|s| parse_value(s.as_ref(), rule)).collect()
}

fn parse_comma_decimal(raw: &str) -> Result<Decimal> {
    let s = raw.trim();
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    to_decimal(&normalized, raw)
}

fn parse_marked(raw: &str) -> Result<Decimal> {
    let s = raw.trim();
    let (amount, debit) = match MARKED.captures(s) {
        Some(caps) => {
            let amount = caps.name("amount").map_or("", |m| m.as_str());
            let debit = caps.name("marker").map_or(false, |m| m.as_str() == "D");
            (amount.trim(), debit)
        }
        None => (s, false),
    };
    let normalized = amount.replace('.', "").replace(',', ".");
    let magnitude = to_decimal(&normalized, raw)?.abs();
    Ok(if debit { -magnitude } else { magnitude })
}

/// Only digits and `.` may follow an optional leading sign.
fn to_decimal(normalized: &str, raw: &str) -> Result<Decimal> {
    let invalid = || Error::ValueFormat {
        value: raw.to_string(),
        line: None,
    };
    let digits = normalized.strip_prefix(['-', '+']).unwrap_or(normalized);
    if !digits.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }
    normalized.parse::<Decimal>().map_err(|_| invalid())
}

/// Round to cents for export. Negative zero collapses to zero.
pub fn round_money(value: Decimal) -> Decimal {
    let r = value.round_dp(2);
    if r.is_zero() { Decimal::ZERO } else { r }
}

/// Two decimals with a dot, as written to exported tables.
pub fn format_cents(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Render `value` the way the bank prints it: `-5.000,00`.
pub fn format_br(value: Decimal) -> String {
    let s = format_cents(value);
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int, frac) = digits.split_once('.').unwrap_or((digits, "00"));
    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}{},{}", sign, grouped, frac)
}
