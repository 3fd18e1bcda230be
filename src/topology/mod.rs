// SPDX-License-Identifier: Apache-2.0

pub mod reformat;
pub mod schedule;
pub mod worker;
