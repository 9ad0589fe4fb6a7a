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

//! Demonstration data.
//!
//! Seeds a ledger with a small shop's recent history: five customers, six
//! bikes and seven hires covering every outcome (returned on time, returned
//! late, returned damaged, still out, overdue). The history is replayed through
//! the normal lifecycle operations on back-dated clocks, so the result obeys
//! every ledger invariant.

use crate::base::{BikeId, CustomerId, HireId};
use crate::bike::NewBike;
use crate::clock::FixedClock;
use crate::customer::NewCustomer;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::info;

const CUSTOMERS: [(&str, &str, &str, &str, &str); 5] = [
    ("Jane", "North", "5 Newton Road", "Newton Longville", "MK17 9GQ"),
    ("Elvis", "Blakeland", "49 Roxton Road", "Great Barford", "MK44 5YJ"),
    ("Samantha", "Heyman", "16 Orchard Way", "Buckingham", "MK18 2NG"),
    ("Christopher", "Hamelton", "28 Clovelly Court", "Corby", "NN18 8EF"),
    ("Nicky", "Stern", "59 Kingsway", "Luton", "LU4 8AU"),
];

const BIKES: [(&str, &str, &str, &str, &str, Decimal, Decimal); 6] = [
    ("Scott", "Ransom", "mountain", "men", "silver", dec!(30), dec!(50)),
    ("Breezer", "Beamer", "mountain", "women", "purple pearl", dec!(26.40), dec!(38)),
    ("Cannondale", "Road Warrior 500", "hybrid", "adult", "dark green", dec!(20), dec!(32)),
    ("Alliant", "XPRESS Pro", "BMX", "boy", "chrome", dec!(12.70), dec!(20)),
    ("Breezer", "Venturi", "racing", "girl", "sky blue", dec!(59), dec!(100)),
    ("Giant", "Areva 24", "mountain", "children", "blue", dec!(14.25), dec!(23)),
];

/// Appends the demonstration history to `ledger`, ending on the ledger's today.
///
/// The ledger's clock is restored afterwards, whatever the outcome.
pub fn seed(ledger: &mut Ledger) -> Result<(), LedgerError> {
    let today = ledger.today();
    let previous = ledger.replace_clock(Box::new(FixedClock(today)));
    let result = replay(ledger, today);
    ledger.replace_clock(previous);

    if result.is_ok() {
        let newly_late = ledger.refresh_late_hires();
        info!(
            customers = ledger.customers().len(),
            bikes = ledger.bikes().len(),
            hires = ledger.hires().len(),
            newly_late,
            "demo data seeded"
        );
    }
    result
}

fn replay(ledger: &mut Ledger, today: NaiveDate) -> Result<(), LedgerError> {
    let customers: Vec<CustomerId> = CUSTOMERS
        .iter()
        .map(|&(first_name, last_name, address_line1, town, postcode)| {
            ledger.add_customer(NewCustomer {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                address_line1: address_line1.to_string(),
                town: town.to_string(),
                postcode: postcode.to_string(),
            })
        })
        .collect();

    let bikes: Vec<BikeId> = BIKES
        .iter()
        .map(|&(make, model, function, demographic, colour, daily_rate, deposit)| {
            ledger.add_bike(NewBike {
                make: make.to_string(),
                model: model.to_string(),
                function: function.to_string(),
                demographic: demographic.to_string(),
                colour: colour.to_string(),
                daily_rate,
                deposit,
            })
        })
        .collect();

    let ago = |days: u64| today - Days::new(days);
    let ahead = |days: u64| today + Days::new(days);

    // Returned on time.
    let on_time = start(ledger, ago(50), customers[0], bikes[1], ago(45))?;
    // Returned on time, damaged.
    let damaged = start(ledger, ago(47), customers[1], bikes[0], ago(46))?;
    finish(ledger, ago(46), damaged, true)?;
    finish(ledger, ago(45), on_time, false)?;

    // Returned two days late.
    let late = start(ledger, ago(20), customers[0], bikes[2], ago(17))?;
    finish(ledger, ago(15), late, false)?;

    // Returned four days late and damaged, then repaired.
    let late_damaged = start(ledger, ago(10), customers[2], bikes[4], ago(7))?;
    // Still out and overdue.
    start(ledger, ago(6), customers[4], bikes[1], ago(2))?;
    // Due back today.
    start(ledger, ago(4), customers[3], bikes[5], today)?;
    finish(ledger, ago(3), late_damaged, true)?;
    ledger.repair_bike(bikes[4])?;

    // Due back tomorrow.
    start(ledger, ago(2), customers[0], bikes[4], ahead(1))?;

    Ok(())
}

/// Books and pays for a hire on `on`.
fn start(
    ledger: &mut Ledger,
    on: NaiveDate,
    customer: CustomerId,
    bike: BikeId,
    end_date: NaiveDate,
) -> Result<HireId, LedgerError> {
    ledger.set_clock(FixedClock(on));
    let (hire, _) = ledger.book_hire(customer, bike, end_date)?;
    ledger.pay_for_hire(hire)?;
    Ok(hire)
}

/// Returns a hire on `on` and issues its inbound invoice.
fn finish(ledger: &mut Ledger, on: NaiveDate, hire: HireId, damaged: bool) -> Result<(), LedgerError> {
    ledger.set_clock(FixedClock(on));
    ledger.check_in(hire, damaged)?;
    Ok(())
}
