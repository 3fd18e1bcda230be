// SPDX-License-Identifier: Apache-2.0

pub mod blackhole;
pub mod directory;
pub mod file;
pub mod http;
pub mod sink;
