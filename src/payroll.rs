// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! 2025 payroll withholding tables (INSS and IRRF).

use crate::value::round_money;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;

/// `(ceiling, rate)` per INSS band, Portaria Interministerial MPS/MF nº 6.
pub static INSS_2025: Lazy<[(Decimal, Decimal); 4]> = Lazy::new(|| {
    [
        (Decimal::new(151800, 2), Decimal::new(75, 3)),
        (Decimal::new(279388, 2), Decimal::new(9, 2)),
        (Decimal::new(419083, 2), Decimal::new(12, 2)),
        (Decimal::new(815741, 2), Decimal::new(14, 2)),
    ]
});

/// `(lower, upper, rate, deduction)` per IRRF band, MP nº 1.294/2025.
/// The last band has no upper bound.
pub static IRRF_2025: Lazy<[(Decimal, Option<Decimal>, Decimal, Decimal); 4]> = Lazy::new(|| {
    [
        (
            Decimal::new(242881, 2),
            Some(Decimal::new(282665, 2)),
            Decimal::new(75, 3),
            Decimal::new(18216, 2),
        ),
        (
            Decimal::new(282666, 2),
            Some(Decimal::new(375105, 2)),
            Decimal::new(15, 2),
            Decimal::new(39416, 2),
        ),
        (
            Decimal::new(375106, 2),
            Some(Decimal::new(466468, 2)),
            Decimal::new(225, 3),
            Decimal::new(67549, 2),
        ),
        (
            Decimal::new(466468, 2),
            None,
            Decimal::new(275, 3),
            Decimal::new(90873, 2),
        ),
    ]
});

/// Progressive INSS contribution on a gross salary, capped at the last ceiling.
pub fn inss(gross: Decimal) -> Decimal {
    let mut floor = Decimal::ZERO;
    let mut total = Decimal::ZERO;
    for (ceiling, rate) in INSS_2025.iter() {
        if gross <= floor {
            break;
        }
        total += (gross.min(*ceiling) - floor) * *rate;
        floor = *ceiling;
    }
    round_money(total)
}

/// IRRF withheld on a taxable base: `base × rate − deduction` of its band.
pub fn irrf(base: Decimal) -> Decimal {
    let band = IRRF_2025
        .iter()
        .find(|(lower, upper, _, _)| base >= *lower && upper.is_none_or(|u| base <= u))
        .or_else(|| IRRF_2025.iter().rev().find(|(lower, ..)| base >= *lower));
    match band {
        Some((_, _, rate, deduction)) => {
            round_money((base * *rate - *deduction).max(Decimal::ZERO))
        }
        None => Decimal::ZERO,
    }
}
