// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fluxo::error::Error;
use fluxo::value::{ValueRule, format_br, parse_value, parse_values, round_money};
use rust_decimal::Decimal;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn comma_decimal_strips_thousands_and_keeps_sign() {
    let rule = ValueRule::CommaDecimal;
    assert_eq!(parse_value("5.000,00", rule).unwrap(), d("5000.00"));
    assert_eq!(parse_value("-403,00", rule).unwrap(), d("-403.00"));
    assert_eq!(parse_value("  1.234.567,89 ", rule).unwrap(), d("1234567.89"));
    assert_eq!(parse_value("12.5", rule).unwrap(), d("12.5"));
}

#[test]
fn direction_marker_sets_sign_from_suffix() {
    let rule = ValueRule::DirectionMarker;
    assert_eq!(parse_value("5.000,00 C", rule).unwrap(), d("5000.00"));
    assert_eq!(parse_value("403,00 D", rule).unwrap(), d("-403.00"));
    assert_eq!(parse_value("-403,00 D", rule).unwrap(), d("-403.00"));
    assert_eq!(parse_value("0,00 C", rule).unwrap(), Decimal::ZERO);
    // Without a marker the magnitude is taken as-is.
    assert_eq!(parse_value("-12,00", rule).unwrap(), d("12.00"));
}

#[test]
fn garbage_is_a_value_format_error() {
    match parse_value("abc", ValueRule::CommaDecimal) {
        Err(Error::ValueFormat { value, line }) => {
            assert_eq!(value, "abc");
            assert_eq!(line, None);
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert!(parse_value("", ValueRule::CommaDecimal).is_err());
    assert!(parse_value("5.000,00 C", ValueRule::CommaDecimal).is_err());
    assert!(parse_value("x D", ValueRule::DirectionMarker).is_err());
}

#[test]
fn stray_characters_between_digits_are_rejected() {
    for raw in ["1_0,00", "1 000,00", "10,0x", "--5,00"] {
        assert!(
            matches!(
                parse_value(raw, ValueRule::CommaDecimal),
                Err(Error::ValueFormat { .. })
            ),
            "{}",
            raw
        );
    }
    assert!(matches!(
        parse_value("1_0,00 C", ValueRule::DirectionMarker),
        Err(Error::ValueFormat { .. })
    ));
    assert_eq!(parse_value("+7,50", ValueRule::CommaDecimal).unwrap(), d("7.50"));
}

#[test]
fn parse_values_keeps_length_and_order() {
    let out = parse_values(&["1,00", "-2,50", "3.000,00"], ValueRule::CommaDecimal).unwrap();
    assert_eq!(out, vec![d("1.00"), d("-2.50"), d("3000.00")]);

    let err = parse_values(&["1,00", "oops"], ValueRule::CommaDecimal).unwrap_err();
    assert!(err.to_string().contains("oops"));
}

#[test]
fn format_br_groups_thousands() {
    assert_eq!(format_br(d("5000")), "5.000,00");
    assert_eq!(format_br(d("-403")), "-403,00");
    assert_eq!(format_br(d("1234567.891")), "1.234.567,89");
    assert_eq!(format_br(d("100")), "100,00");
    assert_eq!(format_br(Decimal::ZERO), "0,00");
    assert_eq!(format_br(d("-0.001")), "0,00");
}

#[test]
fn brazilian_format_is_stable_through_display() {
    for s in ["5.000,00", "-403,00", "0,01", "12.345.678,90"] {
        let v = parse_value(s, ValueRule::CommaDecimal).unwrap();
        let again = parse_value(&format_br(v), ValueRule::CommaDecimal).unwrap();
        assert_eq!(round_money(again), round_money(v), "{}", s);
    }
}
