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

//! Error types for ledger lookups, identifier parsing and persistence.
//!
//! Illegal state transitions are not errors: the state machines report them
//! as a `false` result and leave the state unchanged.

use crate::base::{BikeId, CustomerId, HireId, InvoiceInId, InvoiceOutId};
use crate::registry::EntityKind;
use std::path::PathBuf;
use thiserror::Error;

/// Ledger lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Referenced customer does not exist
    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    /// Referenced bike does not exist
    #[error("bike {0} not found")]
    BikeNotFound(BikeId),

    /// Referenced hire does not exist
    #[error("hire {0} not found")]
    HireNotFound(HireId),

    /// Referenced outbound invoice does not exist
    #[error("invoice {0} not found")]
    InvoiceOutNotFound(InvoiceOutId),

    /// Referenced inbound invoice does not exist
    #[error("invoice {0} not found")]
    InvoiceInNotFound(InvoiceInId),

    /// Inbound invoices are only issued for returned hires
    #[error("hire {0} has not been returned")]
    HireNotReturned(HireId),

    /// A hire has at most one invoice of each kind
    #[error("hire {hire} already has an {kind}")]
    AlreadyInvoiced { hire: HireId, kind: EntityKind },
}

/// A formatted identifier could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} id '{input}' (expected {}<number>)", .kind.prefix())]
pub struct ParseIdError {
    pub kind: EntityKind,
    pub input: String,
}

/// Snapshot persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No snapshot has been saved yet
    #[error("no ledger snapshot at {}", .0.display())]
    NotFound(PathBuf),

    #[error("ledger snapshot I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported ledger snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("ledger snapshot is malformed: {0}")]
    Format(#[from] serde_json::Error),

    /// A stored cross-reference does not resolve to an entity in the snapshot
    #[error("{owner} references missing {kind} #{sequence}")]
    DanglingReference {
        owner: String,
        kind: EntityKind,
        sequence: u32,
    },

    /// Stored identifiers are not strictly increasing in insertion order
    #[error("{kind} #{sequence} is out of sequence")]
    OutOfSequence { kind: EntityKind, sequence: u32 },

    /// The last stored identifier leaves no number for the next entity
    #[error("{kind} #{sequence} exhausts the identifier range")]
    SequenceExhausted { kind: EntityKind, sequence: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::CustomerNotFound(CustomerId(3)).to_string(),
            "customer CUST3 not found"
        );
        assert_eq!(LedgerError::BikeNotFound(BikeId(1)).to_string(), "bike BIKE1 not found");
        assert_eq!(LedgerError::HireNotFound(HireId(2)).to_string(), "hire HIRE2 not found");
        assert_eq!(
            LedgerError::InvoiceOutNotFound(InvoiceOutId(4)).to_string(),
            "invoice INV-OUT-4 not found"
        );
        assert_eq!(
            LedgerError::InvoiceInNotFound(InvoiceInId(5)).to_string(),
            "invoice INV-IN-5 not found"
        );
        assert_eq!(
            LedgerError::HireNotReturned(HireId(6)).to_string(),
            "hire HIRE6 has not been returned"
        );
        assert_eq!(
            LedgerError::AlreadyInvoiced {
                hire: HireId(7),
                kind: EntityKind::InvoiceOut
            }
            .to_string(),
            "hire HIRE7 already has an outbound invoice"
        );
    }

    #[test]
    fn parse_error_names_expected_prefix() {
        let err = ParseIdError {
            kind: EntityKind::Bike,
            input: "CUST1".to_string(),
        };
        assert_eq!(err.to_string(), "invalid bike id 'CUST1' (expected BIKE<number>)");
    }

    #[test]
    fn store_error_display_messages() {
        let err = StoreError::DanglingReference {
            owner: "HIRE4".to_string(),
            kind: EntityKind::Bike,
            sequence: 9,
        };
        assert_eq!(err.to_string(), "HIRE4 references missing bike #9");

        let err = StoreError::OutOfSequence {
            kind: EntityKind::Customer,
            sequence: 2,
        };
        assert_eq!(err.to_string(), "customer #2 is out of sequence");
    }

    #[test]
    fn errors_are_cloneable() {
        let error = LedgerError::HireNotFound(HireId(1));
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
