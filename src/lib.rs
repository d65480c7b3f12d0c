// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod error;
pub mod models;
pub mod value;
pub mod statement;
pub mod flow;
pub mod cashflow;
pub mod report;
pub mod budget;
pub mod nfse;
pub mod payroll;
pub mod config;
pub mod cli;
pub mod utils;
pub mod commands;
