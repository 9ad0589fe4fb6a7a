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

//! Invoice calculations and invoice snapshots.
//!
//! An outbound invoice is issued when a hire is booked and charges the hire
//! cost plus the bike's deposit. An inbound invoice is issued once the bike is
//! back; it records whether the bike came back damaged (the deposit is kept)
//! and charges a late fee when the hire overran.
//!
//! Amounts are captured from the bike when the invoice is issued, so later
//! changes to the bike's rates do not alter invoices already issued.

use crate::base::{HireId, InvoiceInId, InvoiceOutId};
use crate::bike::Bike;
use crate::customer::Customer;
use crate::hire::Hire;
use crate::registry::Sequenced;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Late days are charged at one and a half times the daily rate.
pub const LATE_FEE_MULTIPLIER: Decimal = dec!(1.5);

/// `daily_rate × days`
pub fn hire_cost(daily_rate: Decimal, days: i64) -> Decimal {
    daily_rate * Decimal::from(days)
}

/// `cost + deposit`
pub fn total_due(cost: Decimal, deposit: Decimal) -> Decimal {
    cost + deposit
}

/// `days_late × daily_rate × 1.5`, zero when not late.
pub fn late_fee(days_late: i64, daily_rate: Decimal) -> Decimal {
    if days_late <= 0 {
        return Decimal::ZERO;
    }
    Decimal::from(days_late) * daily_rate * LATE_FEE_MULTIPLIER
}

/// Formats an amount in pounds, e.g. `£1,234.50`.
pub fn format_pounds(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}£{grouped}.{fraction}")
}

/// Invoice issued when a hire is booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceOut {
    id: InvoiceOutId,
    hire: HireId,
    issued_on: NaiveDate,
    daily_rate: Decimal,
    deposit: Decimal,
    duration: i64,
}

impl InvoiceOut {
    pub(crate) fn new(id: InvoiceOutId, hire: &Hire, bike: &Bike, issued_on: NaiveDate) -> Self {
        Self {
            id,
            hire: hire.id(),
            issued_on,
            daily_rate: bike.daily_rate(),
            deposit: bike.deposit(),
            duration: hire.duration(),
        }
    }

    pub fn id(&self) -> InvoiceOutId {
        self.id
    }

    pub fn hire(&self) -> HireId {
        self.hire
    }

    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }

    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate
    }

    pub fn deposit(&self) -> Decimal {
        self.deposit
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    /// Hire charge without the deposit.
    pub fn cost(&self) -> Decimal {
        hire_cost(self.daily_rate, self.duration)
    }

    /// Amount due: hire charge plus deposit.
    pub fn total(&self) -> Decimal {
        total_due(self.cost(), self.deposit)
    }

    /// Printable invoice document.
    pub fn render(&self, customer: &Customer, hire: &Hire, bike: &Bike) -> String {
        let mut doc = header(&self.id.to_string(), self.issued_on, customer, hire, bike);
        let _ = write!(
            doc,
            "\n\nAmount due\
             \nBike cost: {}\
             \nDeposit: {}\
             \nTotal: {}",
            format_pounds(self.cost()),
            format_pounds(self.deposit),
            format_pounds(self.total()),
        );
        doc
    }
}

impl Sequenced for InvoiceOut {
    fn sequence(&self) -> u32 {
        self.id.sequence()
    }
}

/// Invoice issued when a hire is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceIn {
    id: InvoiceInId,
    hire: HireId,
    issued_on: NaiveDate,
    bike_damaged: bool,
    daily_rate: Decimal,
}

impl InvoiceIn {
    /// Must be issued after the hire's return has been applied to `bike`.
    pub(crate) fn new(id: InvoiceInId, hire: &Hire, bike: &Bike, issued_on: NaiveDate) -> Self {
        Self {
            id,
            hire: hire.id(),
            issued_on,
            bike_damaged: bike.is_damaged(),
            daily_rate: bike.daily_rate(),
        }
    }

    pub fn id(&self) -> InvoiceInId {
        self.id
    }

    pub fn hire(&self) -> HireId {
        self.hire
    }

    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }

    pub fn daily_rate(&self) -> Decimal {
        self.daily_rate
    }

    pub fn was_bike_damaged(&self) -> bool {
        self.bike_damaged
    }

    /// The deposit is kept when the bike came back damaged.
    pub fn deposit_refunded(&self) -> bool {
        !self.bike_damaged
    }

    /// Late fee for the hire as of `today`. Fixed once the hire is complete.
    pub fn late_fee(&self, hire: &Hire, today: NaiveDate) -> Decimal {
        late_fee(hire.days_late(today), self.daily_rate)
    }

    /// Printable invoice document.
    pub fn render(&self, customer: &Customer, hire: &Hire, bike: &Bike, today: NaiveDate) -> String {
        let mut doc = header(&self.id.to_string(), self.issued_on, customer, hire, bike);
        let returned_on = hire
            .date_returned()
            .map_or_else(|| "-".to_string(), |date| date.to_string());
        let _ = write!(
            doc,
            "\n\nReturned on: {}\
             \nDays late: {}\
             \nLate fee: {}\
             \nDeposit refunded: {}",
            returned_on,
            hire.days_late(today),
            format_pounds(self.late_fee(hire, today)),
            if self.deposit_refunded() { "yes" } else { "no" },
        );
        doc
    }
}

impl Sequenced for InvoiceIn {
    fn sequence(&self) -> u32 {
        self.id.sequence()
    }
}

fn header(
    invoice_id: &str,
    issued_on: NaiveDate,
    customer: &Customer,
    hire: &Hire,
    bike: &Bike,
) -> String {
    let mut doc = String::from("-- INVOICE --\n");
    let _ = write!(
        doc,
        "\nInvoice ID: {invoice_id}\
         \nDate created: {issued_on}\
         \n\nCustomer ID: {}\
         \nName: {}\
         \nAddress: {}\
         \n\nHire ID: {}\
         \nStart date: {}\
         \nEnd date: {}\
         \n\nBike ID: {}\
         \nDescription: {}\
         \nDaily rate: {}",
        customer.id(),
        customer.full_name(),
        customer.address(),
        hire.id(),
        hire.start_date(),
        hire.end_date(),
        bike.id(),
        bike.description(),
        format_pounds(bike.daily_rate()),
    );
    doc
}
