// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use fluxo::config::Settings;
use fluxo::error::Error;
use fluxo::models::account_type;
use std::fs;
use tempfile::tempdir;

#[test]
fn defaults_apply_to_missing_keys() {
    let s = Settings::from_json(r#"{"categories": {"bb-cc": ["Mercado", "Aluguel"]}}"#).unwrap();
    assert_eq!(s.delimiter(), b';');
    assert_eq!(s.table_width, 120);
    assert_eq!(s.data_folder, None);

    let cc = account_type("bb-cc").unwrap();
    let pp = account_type("bb-pp").unwrap();
    assert_eq!(s.categories_for(&cc), ["Mercado".to_string(), "Aluguel".to_string()]);
    assert!(s.categories_for(&pp).is_empty());
    assert_eq!(s.balances_file_for(&cc), "SALDOS_BB_CC.csv");
}

#[test]
fn rejects_bad_settings() {
    assert!(matches!(Settings::from_json("{"), Err(Error::Config(_))));
    assert!(matches!(
        Settings::from_json(r#"{"csv_delimiter": "§"}"#),
        Err(Error::Config(_))
    ));
}

#[test]
fn loads_an_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fluxo.json");
    fs::write(
        &path,
        r#"{"csv_delimiter": ",", "balances_file": "saldos_{ACCOUNT}.csv", "data_folder": "/data"}"#,
    )
    .unwrap();

    let s = Settings::load(Some(&path)).unwrap();
    assert_eq!(s.delimiter(), b',');
    assert_eq!(s.data_folder.as_deref(), Some(std::path::Path::new("/data")));
    assert_eq!(
        s.balances_file_for(&account_type("bb-ccpj").unwrap()),
        "saldos_CCPJ.csv"
    );

    assert!(Settings::load(Some(&dir.path().join("missing.json"))).is_err());
}
