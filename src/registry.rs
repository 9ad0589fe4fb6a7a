// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Sequential identifier assignment.
//!
//! Sequence numbers are derived from the ledger itself: the next number for a
//! kind is the sequence number of the last entity of that kind plus one, or `1`
//! when none exist. There is no separate counter to keep in sync and no number
//! is ever reused, because entities are never removed.

use crate::error::ParseIdError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kinds of entity that receive sequential identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Customer,
    Bike,
    Hire,
    InvoiceOut,
    InvoiceIn,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Customer,
        EntityKind::Bike,
        EntityKind::Hire,
        EntityKind::InvoiceOut,
        EntityKind::InvoiceIn,
    ];

    /// Fixed prefix of the formatted identifier.
    pub fn prefix(self) -> &'static str {
        match self {
            EntityKind::Customer => "CUST",
            EntityKind::Bike => "BIKE",
            EntityKind::Hire => "HIRE",
            EntityKind::InvoiceOut => "INV-OUT-",
            EntityKind::InvoiceIn => "INV-IN-",
        }
    }

    /// Formats `sequence` as a human-readable identifier of this kind.
    pub fn format(self, sequence: u32) -> String {
        format!("{}{}", self.prefix(), sequence)
    }

    /// Parses a formatted identifier of this kind back into its sequence number.
    ///
    /// The prefix is matched case-insensitively and must be followed by decimal
    /// digits only. Sequence numbers start at 1.
    pub fn parse(self, input: &str) -> Result<u32, ParseIdError> {
        let input = input.trim();
        let prefix = self.prefix();
        let err = || ParseIdError {
            kind: self,
            input: input.to_string(),
        };

        let head = input.get(..prefix.len()).ok_or_else(err)?;
        if !head.eq_ignore_ascii_case(prefix) {
            return Err(err());
        }

        let digits = &input[prefix.len()..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        match digits.parse::<u32>() {
            Ok(sequence) if sequence > 0 => Ok(sequence),
            _ => Err(err()),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Customer => "customer",
            EntityKind::Bike => "bike",
            EntityKind::Hire => "hire",
            EntityKind::InvoiceOut => "outbound invoice",
            EntityKind::InvoiceIn => "inbound invoice",
        };
        f.write_str(name)
    }
}

/// An entity that carries a sequence number assigned by the registry.
pub trait Sequenced {
    fn sequence(&self) -> u32;
}

/// Returns the sequence number to assign to the next entity appended after `existing`.
///
/// Loading rejects a last sequence of `u32::MAX`, so the increment cannot overflow.
pub fn next_sequence<T: Sequenced>(existing: &[T]) -> u32 {
    existing.last().map_or(1, |last| last.sequence() + 1)
}
