// SPDX-License-Identifier: Apache-2.0

mod column;
mod record;

pub use column::Column;
pub use record::{NormalizedRecord, RecordKind};
