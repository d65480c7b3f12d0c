// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod parse;
pub mod cashflow;
pub mod report;
pub mod budget;
pub mod nfse;
pub mod payroll;
