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

//! Identifier types for customers, bikes, hires and invoices.
//!
//! Every identifier wraps the entity's sequence number. The human-readable form
//! (`CUST1`, `BIKE2`, `HIRE3`, `INV-OUT-4`, `INV-IN-5`) is produced by `Display`
//! and accepted back by `FromStr`.

use crate::error::ParseIdError;
use crate::registry::EntityKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! sequence_id {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const KIND: EntityKind = $kind;

            /// The raw sequence number.
            pub fn sequence(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", Self::KIND.prefix(), self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::KIND.parse(s).map($name)
            }
        }
    };
}

sequence_id!(
    /// Unique identifier for a customer (`CUST<n>`).
    CustomerId => EntityKind::Customer
);

sequence_id!(
    /// Unique identifier for a bike (`BIKE<n>`).
    BikeId => EntityKind::Bike
);

sequence_id!(
    /// Unique identifier for a hire (`HIRE<n>`).
    HireId => EntityKind::Hire
);

sequence_id!(
    /// Unique identifier for an invoice issued when a hire is created (`INV-OUT-<n>`).
    InvoiceOutId => EntityKind::InvoiceOut
);

sequence_id!(
    /// Unique identifier for an invoice issued when a hire is returned (`INV-IN-<n>`).
    InvoiceInId => EntityKind::InvoiceIn
);
