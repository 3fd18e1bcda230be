// SPDX-License-Identifier: Apache-2.0

pub mod args;
pub mod batch_output;
mod parse;
pub mod sink;
