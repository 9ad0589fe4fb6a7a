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

//! Fleet and hire statistics.
//!
//! Nothing is cached: every query scans the ledger as it is now. Hire states
//! are counted as last observed, so callers that want overdue hires counted as
//! late should run [`Ledger::refresh_late_hires`] first.

use crate::base::BikeId;
use crate::bike::BikeState;
use crate::hire::HireState;
use crate::ledger::Ledger;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;

/// Shown in place of a bike when the fleet is empty.
pub const NOT_AVAILABLE: &str = "N/A";

/// On-demand statistics over a ledger.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    ledger: &'a Ledger,
}

impl<'a> Report<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    pub fn total_customers(&self) -> usize {
        self.ledger.customers().len()
    }

    pub fn total_bikes(&self) -> usize {
        self.ledger.bikes().len()
    }

    pub fn total_hires(&self) -> usize {
        self.ledger.hires().len()
    }

    pub fn bikes_available(&self) -> usize {
        self.bikes_in(BikeState::Available)
    }

    pub fn bikes_on_hire(&self) -> usize {
        self.bikes_in(BikeState::OnHire)
    }

    pub fn bikes_damaged(&self) -> usize {
        self.bikes_in(BikeState::Damaged)
    }

    pub fn pending_hires(&self) -> usize {
        self.hires_matching(|state| state == HireState::PaymentPending)
    }

    pub fn active_hires(&self) -> usize {
        self.hires_matching(|state| state == HireState::Active)
    }

    pub fn late_hires(&self) -> usize {
        self.hires_matching(|state| state == HireState::Late)
    }

    pub fn complete_hires(&self) -> usize {
        self.hires_matching(HireState::is_complete)
    }

    /// Bike with the most hires. Ties go to the bike added first.
    pub fn most_popular_bike(&self) -> Option<BikeId> {
        self.popularity_leader(Ordering::Greater)
    }

    /// Bike with the fewest hires. Ties go to the bike added first.
    pub fn least_popular_bike(&self) -> Option<BikeId> {
        self.popularity_leader(Ordering::Less)
    }

    /// Sum of every outbound invoice total, deposits included.
    pub fn invoiced_total(&self) -> Decimal {
        self.ledger.invoices_out().iter().map(|invoice| invoice.total()).sum()
    }

    /// Sum of late fees on inbound invoices as of today.
    pub fn late_fees_total(&self) -> Decimal {
        let today = self.ledger.today();
        self.ledger
            .invoices_in()
            .iter()
            .filter_map(|invoice| {
                let hire = self.ledger.hire(invoice.hire())?;
                Some(invoice.late_fee(hire, today))
            })
            .sum()
    }

    /// Every statistic in one serializable record.
    pub fn summary(&self) -> ReportSummary {
        let display = |bike: Option<BikeId>| {
            bike.map_or_else(|| NOT_AVAILABLE.to_string(), |id| id.to_string())
        };

        ReportSummary {
            total_customers: self.total_customers(),
            total_bikes: self.total_bikes(),
            bikes_available: self.bikes_available(),
            bikes_on_hire: self.bikes_on_hire(),
            bikes_damaged: self.bikes_damaged(),
            most_popular_bike: display(self.most_popular_bike()),
            least_popular_bike: display(self.least_popular_bike()),
            total_hires: self.total_hires(),
            pending_hires: self.pending_hires(),
            active_hires: self.active_hires(),
            late_hires: self.late_hires(),
            complete_hires: self.complete_hires(),
            invoiced_total: self.invoiced_total().round_dp(2),
            late_fees_total: self.late_fees_total().round_dp(2),
        }
    }

    fn bikes_in(&self, state: BikeState) -> usize {
        self.ledger
            .bikes()
            .iter()
            .filter(|bike| bike.state() == state)
            .count()
    }

    fn hires_matching(&self, predicate: impl Fn(HireState) -> bool) -> usize {
        self.ledger
            .hires()
            .iter()
            .filter(|hire| predicate(hire.state()))
            .count()
    }

    /// Scans bikes in insertion order; a later bike only takes the lead when its
    /// hire count compares strictly as `wins` against the leader's.
    fn popularity_leader(&self, wins: Ordering) -> Option<BikeId> {
        let bikes = self.ledger.bikes();
        match bikes {
            [] => return None,
            [only] => return Some(only.id()),
            _ => {}
        }

        let mut leader: Option<(BikeId, usize)> = None;
        for bike in bikes {
            let count = self.ledger.hires_for_bike(bike.id()).count();
            match leader {
                Some((_, best)) if count.cmp(&best) != wins => {}
                _ => leader = Some((bike.id(), count)),
            }
        }
        leader.map(|(id, _)| id)
    }
}

/// Snapshot of every report statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_customers: usize,
    pub total_bikes: usize,
    pub bikes_available: usize,
    pub bikes_on_hire: usize,
    pub bikes_damaged: usize,
    pub most_popular_bike: String,
    pub least_popular_bike: String,
    pub total_hires: usize,
    pub pending_hires: usize,
    pub active_hires: usize,
    pub late_hires: usize,
    pub complete_hires: usize,
    pub invoiced_total: Decimal,
    pub late_fees_total: Decimal,
}
