// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const COL_DATE: &str = "Data";
pub const COL_VALUE: &str = "Valor";
pub const COL_CATEGORY: &str = "Categoria";
pub const COL_DESCRIPTION: &str = "Descricao";
pub const COL_LABEL: &str = "Lancamento";
pub const COL_DETAILS: &str = "Detalhes";
pub const COL_DOCUMENT: &str = "Documento";

/// Columns every canonical table starts with, in this order.
pub const PRIORITY_COLUMNS: [&str; 4] = [COL_DATE, COL_VALUE, COL_CATEGORY, COL_DESCRIPTION];

/// One financial movement in the canonical (Tier 1) schema.
///
/// The passthrough fields are `None` when the source variant does not keep
/// the column at all, and `Some("")` when the column exists but is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub date: NaiveDate,
    pub value: Decimal,
    pub category: String,
    pub description: String,
    pub label: Option<String>,
    pub details: Option<String>,
    pub document: Option<String>,
}

impl CanonicalRecord {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self {
            date,
            value,
            category: String::new(),
            description: String::new(),
            label: None,
            details: None,
            document: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An account type such as `bb-cc`: bank plus account product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountType {
    pub key: &'static str,
    pub bank_name: &'static str,
    pub account_name: &'static str,
}

impl AccountType {
    /// `BB` for `bb-cc`.
    pub fn bank(&self) -> String {
        self.key.split('-').next().unwrap_or_default().to_uppercase()
    }

    /// `CC` for `bb-cc`.
    pub fn account(&self) -> String {
        self.key.split('-').nth(1).unwrap_or_default().to_uppercase()
    }
}

pub const ACCOUNT_TYPES: [AccountType; 3] = [
    AccountType {
        key: "bb-cc",
        bank_name: "Banco do Brasil",
        account_name: "Conta Corrente PF",
    },
    AccountType {
        key: "bb-pp",
        bank_name: "Banco do Brasil",
        account_name: "Conta Poupança PF",
    },
    AccountType {
        key: "bb-ccpj",
        bank_name: "Banco do Brasil",
        account_name: "Conta Corrente PJ",
    },
];

pub fn account_type(key: &str) -> Option<AccountType> {
    let key = key.trim().to_lowercase();
    ACCOUNT_TYPES.iter().copied().find(|a| a.key == key)
}
