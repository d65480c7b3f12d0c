// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{Error, Result};
use crate::models::AccountType;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Fluxo", "fluxo"));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Used when a command is run without `--folder`.
    pub data_folder: Option<PathBuf>,
    pub csv_delimiter: char,
    /// Width of the rules printed around terminal output.
    pub table_width: usize,
    /// Extra category panels per account type, e.g. `{"bb-cc": ["Mercado"]}`.
    pub categories: BTreeMap<String, Vec<String>>,
    /// `{BANK}` and `{ACCOUNT}` are substituted.
    pub balances_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_folder: None,
            csv_delimiter: ';',
            table_width: 120,
            categories: BTreeMap::new(),
            balances_file: "SALDOS_{BANK}_{ACCOUNT}.csv".to_string(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from(APP.0, APP.1, APP.2).map(|p| p.config_dir().join("config.json"))
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        let s: Settings = serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        if !s.csv_delimiter.is_ascii() {
            return Err(Error::Config(format!(
                "csv_delimiter must be a single ASCII character, got '{}'",
                s.csv_delimiter
            )));
        }
        Ok(s)
    }

    /// Explicit path if given, then the platform config file, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match config_path() {
                Some(p) if p.exists() => p,
                _ => {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };
        debug!(path = %path.display(), "loading config");
        let text = fs::read_to_string(&path)?;
        Self::from_json(&text)
    }

    pub fn delimiter(&self) -> u8 {
        self.csv_delimiter as u8
    }

    pub fn balances_file_for(&self, account: &AccountType) -> String {
        self.balances_file
            .replace("{BANK}", &account.bank())
            .replace("{ACCOUNT}", &account.account())
    }

    pub fn categories_for(&self, account: &AccountType) -> &[String] {
        self.categories
            .get(account.key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
