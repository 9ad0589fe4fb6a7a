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

//! Bikes and the bike state machine.
//!
//! A bike is in exactly one state at a time:
//!
//! ```text
//!  Available ──collect──► OnHire ──return(ok)──────► Available
//!      ▲                     │
//!      │                     └──return(damaged)──► Damaged
//!      └───────────repair────────────────────────────┘
//! ```
//!
//! Every other operation is refused: the method returns `false` and the state
//! is left as it was.
//!
//! # Example
//!
//! ```
//! use bike_hire_ledger::{BikeState, Ledger, NewBike};
//! use rust_decimal_macros::dec;
//!
//! let mut ledger = Ledger::new();
//! let id = ledger.add_bike(NewBike {
//!     make: "Scott".into(),
//!     model: "Ransom".into(),
//!     function: "mountain".into(),
//!     demographic: "men".into(),
//!     colour: "silver".into(),
//!     daily_rate: dec!(30),
//!     deposit: dec!(50),
//! });
//!
//! let bike = ledger.bike_mut(id).unwrap();
//! assert!(bike.collect());
//! assert!(!bike.collect());
//! assert_eq!(bike.state(), BikeState::OnHire);
//! ```

use crate::base::BikeId;
use crate::registry::Sequenced;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Hire eligibility of a bike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BikeState {
    #[default]
    Available,
    OnHire,
    Damaged,
}

/// Something that happens to a bike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BikeEvent {
    Collect,
    Return { damaged: bool },
    Repair,
}

impl BikeState {
    /// The state reached by applying `event`, or `None` if this state forbids it.
    pub fn next(self, event: BikeEvent) -> Option<BikeState> {
        match (self, event) {
            (BikeState::Available, BikeEvent::Collect) => Some(BikeState::OnHire),
            (BikeState::OnHire, BikeEvent::Return { damaged: true }) => Some(BikeState::Damaged),
            (BikeState::OnHire, BikeEvent::Return { damaged: false }) => Some(BikeState::Available),
            (BikeState::Damaged, BikeEvent::Repair) => Some(BikeState::Available),
            _ => None,
        }
    }

    pub fn is_damaged(self) -> bool {
        self == BikeState::Damaged
    }

    /// Label shown to staff.
    pub fn label(self) -> &'static str {
        match self {
            BikeState::Available => "Available",
            BikeState::OnHire => "On hire",
            BikeState::Damaged => "Damaged",
        }
    }
}

impl fmt::Display for BikeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Attributes supplied when adding a bike to the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBike {
    pub make: String,
    pub model: String,
    /// Racing, mountain, BMX, ...
    pub function: String,
    /// Men, women, girl, boy, ...
    pub demographic: String,
    pub colour: String,
    /// Cost of one day's hire.
    pub daily_rate: Decimal,
    /// Fixed deposit taken with every hire.
    pub deposit: Decimal,
}

/// A bike in the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bike {
    id: BikeId,
    make: String,
    model: String,
    function: String,
    demographic: String,
    colour: String,
    daily_rate: Decimal,
    deposit: Decimal,
    state: BikeState,
}

impl Bike {
    /// Creates a bike in the `Available` state.
    pub(crate) fn new(id: BikeId, details: NewBike) -> Self {
        Self {
            id,
            make: details.make,
            model: details.model,
            function: details.function,
            demographic: details.demographic,
            colour: details.colour,
            daily_rate: details.daily_rate,
            deposit: details.deposit,
            state: BikeState::Available,
        }
    }

    pub fn id(&self) -> BikeId {
        self.id
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn demographic(&self) -> &str {
        &self.demographic
    }

    pub fn colour(&self) -> &str {
        &self.colour
    }

    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate
    }

    pub fn deposit(&self) -> Decimal {
        self.deposit
    }

    pub fn state(&self) -> BikeState {
        self.state
    }

    pub fn set_make(&mut self, make: impl Into<String>) {
        self.make = make.into();
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn set_function(&mut self, function: impl Into<String>) {
        self.function = function.into();
    }

    pub fn set_demographic(&mut self, demographic: impl Into<String>) {
        self.demographic = demographic.into();
    }

    pub fn set_colour(&mut self, colour: impl Into<String>) {
        self.colour = colour.into();
    }

    pub fn set_daily_rate(&mut self, daily_rate: Decimal) {
        self.daily_rate = daily_rate;
    }

    pub fn set_deposit(&mut self, deposit: Decimal) {
        self.deposit = deposit;
    }

    /// e.g. "Scott Ransom, men's mountain bike in silver"
    pub fn description(&self) -> String {
        format!(
            "{} {}, {}'s {} bike in {}",
            self.make, self.model, self.demographic, self.function, self.colour
        )
    }

    pub fn status(&self) -> &'static str {
        self.state.label()
    }

    /// The bike leaves the shop with a customer.
    pub fn collect(&mut self) -> bool {
        self.apply(BikeEvent::Collect)
    }

    /// The bike comes back from a hire, possibly damaged.
    pub fn return_bike(&mut self, damaged: bool) -> bool {
        self.apply(BikeEvent::Return { damaged })
    }

    /// A damaged bike is fixed and can be hired again.
    pub fn repair(&mut self) -> bool {
        self.apply(BikeEvent::Repair)
    }

    pub fn is_damaged(&self) -> bool {
        self.state.is_damaged()
    }

    fn apply(&mut self, event: BikeEvent) -> bool {
        match self.state.next(event) {
            Some(next) => {
                debug!(bike = %self.id, from = ?self.state, to = ?next, ?event, "bike transition");
                self.state = next;
                true
            }
            None => {
                debug!(bike = %self.id, state = ?self.state, ?event, "bike transition refused");
                false
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn force_state(&mut self, state: BikeState) {
        self.state = state;
    }
}

impl Sequenced for Bike {
    fn sequence(&self) -> u32 {
        self.id.sequence()
    }
}
