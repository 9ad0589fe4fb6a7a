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

//! Hires and the hire state machine.
//!
//! ```text
//!  PaymentPending ──pay──► Active ──overdue──► Late
//!                            │                  │
//!                            └──return──► Complete ◄──return──┘
//! ```
//!
//! Entering `Active` collects the bike; entering `Complete` records the return
//! date and hands the bike back, damaged or not. `Complete` is terminal.
//!
//! Lateness is not clock driven. An active hire only becomes `Late` when
//! [`Hire::is_late`] is polled on a date after its end date, which is what
//! [`Ledger::refresh_late_hires`](crate::Ledger::refresh_late_hires) does for
//! every hire.

use crate::base::{BikeId, CustomerId, HireId};
use crate::bike::Bike;
use crate::invoice;
use crate::registry::Sequenced;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Fulfilment state of a hire.
///
/// The return date lives inside `Complete`, so a hire has a return date
/// exactly when it is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HireState {
    #[default]
    PaymentPending,
    Active,
    Late,
    Complete { returned_on: NaiveDate },
}

/// Something that happens to a hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HireEvent {
    Pay,
    /// The agreed end date has passed without a return.
    Overdue,
    Return { on: NaiveDate },
}

impl HireState {
    /// The state reached by applying `event`, or `None` if this state forbids it.
    pub fn next(self, event: HireEvent) -> Option<HireState> {
        match (self, event) {
            (HireState::PaymentPending, HireEvent::Pay) => Some(HireState::Active),
            (HireState::Active, HireEvent::Overdue) => Some(HireState::Late),
            (HireState::Active | HireState::Late, HireEvent::Return { on }) => {
                Some(HireState::Complete { returned_on: on })
            }
            _ => None,
        }
    }

    pub fn is_complete(self) -> bool {
        matches!(self, HireState::Complete { .. })
    }

    /// Label without the late suffix; see [`Hire::status`].
    pub fn label(self) -> &'static str {
        match self {
            HireState::PaymentPending => "Payment pending",
            HireState::Active => "Active",
            HireState::Late => "Late",
            HireState::Complete { .. } => "Complete",
        }
    }
}

impl fmt::Display for HireState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One customer hiring one bike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hire {
    id: HireId,
    customer: CustomerId,
    bike: BikeId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    state: HireState,
}

impl Hire {
    /// Creates a hire awaiting payment.
    ///
    /// `end_date` is expected to be after `start_date`; callers validate it.
    pub(crate) fn new(
        id: HireId,
        customer: CustomerId,
        bike: BikeId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            customer,
            bike,
            start_date,
            end_date,
            state: HireState::PaymentPending,
        }
    }

    pub fn id(&self) -> HireId {
        self.id
    }

    pub fn customer(&self) -> CustomerId {
        self.customer
    }

    pub fn bike(&self) -> BikeId {
        self.bike
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// The agreed return date.
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn date_returned(&self) -> Option<NaiveDate> {
        match self.state {
            HireState::Complete { returned_on } => Some(returned_on),
            _ => None,
        }
    }

    pub fn state(&self) -> HireState {
        self.state
    }

    /// Length of the hire in days.
    pub fn duration(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Takes payment and releases the bike to the customer.
    pub fn pay_for_hire(&mut self, bike: &mut Bike) -> bool {
        if !self.apply(HireEvent::Pay) {
            return false;
        }

        debug_assert_eq!(bike.id(), self.bike, "hire paid with the wrong bike");
        if !bike.collect() {
            warn!(hire = %self.id, bike = %bike.id(), state = ?bike.state(), "bike could not be collected");
        }
        true
    }

    /// Reports whether the hire is, or was, late on `today`.
    ///
    /// An active hire past its end date moves to `Late` as a side effect; this
    /// is the only way that transition happens.
    pub fn is_late(&mut self, today: NaiveDate) -> bool {
        match self.state {
            HireState::Active if self.end_date < today => self.apply(HireEvent::Overdue),
            _ => self.late_on(today),
        }
    }

    /// Brings the hire back on `today` and returns the bike, damaged or not.
    pub fn return_hire(&mut self, bike: &mut Bike, damaged: bool, today: NaiveDate) -> bool {
        if !self.apply(HireEvent::Return { on: today }) {
            return false;
        }

        debug_assert_eq!(bike.id(), self.bike, "hire returned with the wrong bike");
        if !bike.return_bike(damaged) {
            warn!(hire = %self.id, bike = %bike.id(), state = ?bike.state(), "bike could not be returned");
        }
        true
    }

    /// Lateness on `today` without any state change.
    ///
    /// A hire out on, or returned on, its end date is not late.
    pub fn late_on(&self, today: NaiveDate) -> bool {
        match self.state {
            HireState::PaymentPending => false,
            HireState::Active => self.end_date < today,
            HireState::Late => true,
            HireState::Complete { returned_on } => returned_on > self.end_date,
        }
    }

    /// Days late: measured to `today` while out, to the return date once complete.
    pub fn days_late(&self, today: NaiveDate) -> i64 {
        if !self.late_on(today) {
            return 0;
        }
        let until = self.date_returned().unwrap_or(today);
        (until - self.end_date).num_days()
    }

    /// Hire charge for `bike` over the agreed duration. Excludes the deposit.
    pub fn cost(&self, bike: &Bike) -> Decimal {
        debug_assert_eq!(bike.id(), self.bike, "hire priced with the wrong bike");
        invoice::hire_cost(bike.daily_rate(), self.duration())
    }

    /// Label shown to staff; completed hires returned late read "Complete (late)".
    pub fn status(&self) -> &'static str {
        match self.state {
            HireState::Complete { returned_on } if returned_on > self.end_date => {
                "Complete (late)"
            }
            state => state.label(),
        }
    }

    fn apply(&mut self, event: HireEvent) -> bool {
        match self.state.next(event) {
            Some(next) => {
                debug!(hire = %self.id, from = ?self.state, to = ?next, ?event, "hire transition");
                self.state = next;
                true
            }
            None => {
                debug!(hire = %self.id, state = ?self.state, ?event, "hire transition refused");
                false
            }
        }
    }
}

impl Sequenced for Hire {
    fn sequence(&self) -> u32 {
        self.id.sequence()
    }
}
