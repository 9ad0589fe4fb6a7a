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

//! Customers.

use crate::base::CustomerId;
use crate::registry::Sequenced;
use serde::{Deserialize, Serialize};

/// Contact details supplied when registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    pub town: String,
    pub postcode: String,
}

/// A registered customer.
///
/// The identifier is fixed at registration; contact details change only
/// through the setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    first_name: String,
    last_name: String,
    address_line1: String,
    town: String,
    postcode: String,
}

impl Customer {
    pub(crate) fn new(id: CustomerId, details: NewCustomer) -> Self {
        Self {
            id,
            first_name: details.first_name,
            last_name: details.last_name,
            address_line1: details.address_line1,
            town: details.town,
            postcode: details.postcode,
        }
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn address_line1(&self) -> &str {
        &self.address_line1
    }

    pub fn town(&self) -> &str {
        &self.town
    }

    pub fn postcode(&self) -> &str {
        &self.postcode
    }

    pub fn set_first_name(&mut self, first_name: impl Into<String>) {
        self.first_name = first_name.into();
    }

    pub fn set_last_name(&mut self, last_name: impl Into<String>) {
        self.last_name = last_name.into();
    }

    pub fn set_address_line1(&mut self, address_line1: impl Into<String>) {
        self.address_line1 = address_line1.into();
    }

    pub fn set_town(&mut self, town: impl Into<String>) {
        self.town = town.into();
    }

    pub fn set_postcode(&mut self, postcode: impl Into<String>) {
        self.postcode = postcode.into();
    }

    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// One-line postal address, e.g. "5 Newton Road, Newton Longville, MK17 9GQ."
    pub fn address(&self) -> String {
        format!("{}, {}, {}.", self.address_line1, self.town, self.postcode)
    }
}

impl Sequenced for Customer {
    fn sequence(&self) -> u32 {
        self.id.sequence()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> Customer {
        Customer::new(
            CustomerId(1),
            NewCustomer {
                first_name: "Jane".to_string(),
                last_name: "North".to_string(),
                address_line1: "5 Newton Road".to_string(),
                town: "Newton Longville".to_string(),
                postcode: "MK17 9GQ".to_string(),
            },
        )
    }

    #[test]
    fn derived_strings() {
        let customer = jane();
        assert_eq!(customer.full_name(), "Jane North");
        assert_eq!(customer.address(), "5 Newton Road, Newton Longville, MK17 9GQ.");
    }

    #[test]
    fn setters_keep_identity() {
        let mut customer = jane();
        customer.set_last_name("Blakeland");
        customer.set_town("Great Barford");
        assert_eq!(customer.id(), CustomerId(1));
        assert_eq!(customer.last_name(), "Blakeland");
        assert_eq!(customer.town(), "Great Barford");
    }
}
