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

//! Bike and hire lifecycle integration tests.

use bike_hire_ledger::{
    BikeId, BikeState, CustomerId, EntityKind, FixedClock, HireId, HireState, Ledger, LedgerError,
    NewBike, NewCustomer,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

fn make_customer(first_name: &str) -> NewCustomer {
    NewCustomer {
        first_name: first_name.into(),
        last_name: "North".into(),
        address_line1: "5 Newton Road".into(),
        town: "Newton Longville".into(),
        postcode: "MK17 9GQ".into(),
    }
}

fn make_bike(daily_rate: Decimal, deposit: Decimal) -> NewBike {
    NewBike {
        make: "Scott".into(),
        model: "Ransom".into(),
        function: "mountain".into(),
        demographic: "men".into(),
        colour: "silver".into(),
        daily_rate,
        deposit,
    }
}

/// Ledger on 1 March with one customer and one bike.
fn setup() -> (Ledger, CustomerId, BikeId) {
    let mut ledger = Ledger::with_clock(FixedClock(date(1)));
    let customer = ledger.add_customer(make_customer("Jane"));
    let bike = ledger.add_bike(make_bike(dec!(15.25), dec!(20.50)));
    (ledger, customer, bike)
}

fn bike_state(ledger: &Ledger, bike: BikeId) -> BikeState {
    ledger.bike(bike).unwrap().state()
}

fn hire_state(ledger: &Ledger, hire: HireId) -> HireState {
    ledger.hire(hire).unwrap().state()
}

// =============================================================================
// Bike state machine
// =============================================================================

#[test]
fn new_bike_is_available() {
    let (ledger, _, bike) = setup();
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);
    assert!(!ledger.bike(bike).unwrap().is_damaged());
}

#[test]
fn bike_full_cycle_with_damage() {
    let (mut ledger, _, bike) = setup();

    assert!(ledger.collect_bike(bike).unwrap());
    assert_eq!(bike_state(&ledger, bike), BikeState::OnHire);

    assert!(ledger.return_bike(bike, true).unwrap());
    assert_eq!(bike_state(&ledger, bike), BikeState::Damaged);
    assert!(ledger.bike(bike).unwrap().is_damaged());

    assert!(ledger.repair_bike(bike).unwrap());
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);
}

#[test]
fn bike_undamaged_return_is_available() {
    let (mut ledger, _, bike) = setup();
    ledger.collect_bike(bike).unwrap();

    assert!(ledger.return_bike(bike, false).unwrap());
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);
}

#[test]
fn bike_rejects_illegal_events() {
    let (mut ledger, _, bike) = setup();

    // available: no return, no repair
    assert!(!ledger.return_bike(bike, false).unwrap());
    assert!(!ledger.repair_bike(bike).unwrap());
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);

    // on hire: no second collect, no repair
    ledger.collect_bike(bike).unwrap();
    assert!(!ledger.collect_bike(bike).unwrap());
    assert!(!ledger.repair_bike(bike).unwrap());
    assert_eq!(bike_state(&ledger, bike), BikeState::OnHire);

    // damaged: no collect, no return
    ledger.return_bike(bike, true).unwrap();
    assert!(!ledger.collect_bike(bike).unwrap());
    assert!(!ledger.return_bike(bike, false).unwrap());
    assert_eq!(bike_state(&ledger, bike), BikeState::Damaged);
}

#[test]
fn unknown_bike_is_an_error() {
    let (mut ledger, _, _) = setup();
    assert_eq!(
        ledger.collect_bike(BikeId(9)),
        Err(LedgerError::BikeNotFound(BikeId(9)))
    );
}

// =============================================================================
// Hire state machine
// =============================================================================

#[test]
fn new_hire_awaits_payment() {
    let (mut ledger, customer, bike) = setup();

    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();

    let record = ledger.hire(hire).unwrap();
    assert_eq!(record.state(), HireState::PaymentPending);
    assert_eq!(record.start_date(), date(1));
    assert_eq!(record.end_date(), date(5));
    assert_eq!(record.duration(), 4);
    assert_eq!(record.date_returned(), None);
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);
}

#[test]
fn hire_requires_known_customer_and_bike() {
    let (mut ledger, customer, bike) = setup();

    assert_eq!(
        ledger.add_hire(CustomerId(7), bike, date(5)),
        Err(LedgerError::CustomerNotFound(CustomerId(7)))
    );
    assert_eq!(
        ledger.add_hire(customer, BikeId(7), date(5)),
        Err(LedgerError::BikeNotFound(BikeId(7)))
    );
    assert!(ledger.hires().is_empty());
}

#[test]
fn payment_collects_the_bike() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();

    assert!(ledger.pay_for_hire(hire).unwrap());

    assert_eq!(hire_state(&ledger, hire), HireState::Active);
    assert_eq!(bike_state(&ledger, bike), BikeState::OnHire);
}

#[test]
fn payment_only_once() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();

    assert!(!ledger.pay_for_hire(hire).unwrap());
    assert_eq!(hire_state(&ledger, hire), HireState::Active);
}

#[test]
fn unpaid_hire_cannot_be_returned() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();

    assert!(!ledger.return_hire(hire, false).unwrap());
    assert_eq!(ledger.check_in(hire, false).unwrap(), None);
    assert_eq!(hire_state(&ledger, hire), HireState::PaymentPending);
    assert!(ledger.invoices_in().is_empty());
}

#[test]
fn on_time_return_completes_and_frees_bike() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();

    ledger.set_clock(FixedClock(date(5)));
    assert!(ledger.return_hire(hire, false).unwrap());

    assert_eq!(
        hire_state(&ledger, hire),
        HireState::Complete { returned_on: date(5) }
    );
    assert_eq!(ledger.hire(hire).unwrap().date_returned(), Some(date(5)));
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);
    assert!(!ledger.is_late(hire).unwrap());
}

#[test]
fn damaged_return_marks_bike_damaged() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();

    let invoice = ledger.check_in(hire, true).unwrap().unwrap();

    assert_eq!(bike_state(&ledger, bike), BikeState::Damaged);
    let invoice = ledger.invoice_in(invoice).unwrap();
    assert!(invoice.was_bike_damaged());
    assert!(!invoice.deposit_refunded());
}

#[test]
fn return_only_once() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();
    ledger.check_in(hire, false).unwrap();

    assert_eq!(ledger.check_in(hire, true).unwrap(), None);
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);
    assert_eq!(ledger.invoices_in().len(), 1);
}

#[test]
fn inbound_invoice_waits_for_the_return() {
    let (mut ledger, customer, bike) = setup();
    let (hire, _) = ledger.book_hire(customer, bike, date(5)).unwrap();

    assert_eq!(ledger.issue_invoice_in(hire), Err(LedgerError::HireNotReturned(hire)));

    ledger.pay_for_hire(hire).unwrap();
    assert_eq!(ledger.issue_invoice_in(hire), Err(LedgerError::HireNotReturned(hire)));
    assert!(ledger.invoices_in().is_empty());

    ledger.return_hire(hire, true).unwrap();
    let invoice = ledger.issue_invoice_in(hire).unwrap();
    assert!(ledger.invoice_in(invoice).unwrap().was_bike_damaged());
}

#[test]
fn one_invoice_of_each_kind_per_hire() {
    let (mut ledger, customer, bike) = setup();
    let (hire, _) = ledger.book_hire(customer, bike, date(5)).unwrap();

    assert_eq!(
        ledger.issue_invoice_out(hire),
        Err(LedgerError::AlreadyInvoiced { hire, kind: EntityKind::InvoiceOut })
    );

    ledger.pay_for_hire(hire).unwrap();
    ledger.check_in(hire, false).unwrap().unwrap();
    assert_eq!(
        ledger.issue_invoice_in(hire),
        Err(LedgerError::AlreadyInvoiced { hire, kind: EntityKind::InvoiceIn })
    );

    assert_eq!(ledger.invoices_out().len(), 1);
    assert_eq!(ledger.invoices_in().len(), 1);
    assert_eq!(ledger.next_sequence(EntityKind::InvoiceIn), 2);
}

// =============================================================================
// Lateness
// =============================================================================

#[test]
fn active_hire_on_end_date_is_not_late() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();

    ledger.set_clock(FixedClock(date(5)));

    assert!(!ledger.is_late(hire).unwrap());
    assert_eq!(hire_state(&ledger, hire), HireState::Active);
}

#[test]
fn active_hire_after_end_date_becomes_late() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();

    ledger.set_clock(FixedClock(date(6)));

    assert!(ledger.is_late(hire).unwrap());
    assert_eq!(hire_state(&ledger, hire), HireState::Late);
    assert_eq!(ledger.hire(hire).unwrap().days_late(date(8)), 3);

    // asking again changes nothing
    assert!(ledger.is_late(hire).unwrap());
    assert_eq!(hire_state(&ledger, hire), HireState::Late);
}

#[test]
fn unpaid_hire_is_never_late() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();

    ledger.set_clock(FixedClock(date(20)));

    assert!(!ledger.is_late(hire).unwrap());
    assert_eq!(hire_state(&ledger, hire), HireState::PaymentPending);
}

#[test]
fn late_hire_can_be_returned() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();
    ledger.set_clock(FixedClock(date(7)));
    ledger.is_late(hire).unwrap();

    assert!(ledger.return_hire(hire, false).unwrap());

    let record = ledger.hire(hire).unwrap();
    assert_eq!(record.state(), HireState::Complete { returned_on: date(7) });
    assert_eq!(record.status(), "Complete (late)");
    assert_eq!(bike_state(&ledger, bike), BikeState::Available);
}

#[test]
fn completed_late_hire_stays_late_and_complete() {
    let (mut ledger, customer, bike) = setup();
    let hire = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(hire).unwrap();
    ledger.set_clock(FixedClock(date(8)));
    ledger.return_hire(hire, false).unwrap();

    ledger.set_clock(FixedClock(date(30)));

    assert!(ledger.is_late(hire).unwrap());
    assert!(ledger.is_late(hire).unwrap());
    assert_eq!(hire_state(&ledger, hire), HireState::Complete { returned_on: date(8) });
    assert_eq!(ledger.hire(hire).unwrap().days_late(date(30)), 3);
}

#[test]
fn refresh_counts_only_newly_late_hires() {
    let (mut ledger, customer, bike) = setup();
    let other_bike = ledger.add_bike(make_bike(dec!(10), dec!(10)));
    let overdue = ledger.add_hire(customer, bike, date(3)).unwrap();
    let on_time = ledger.add_hire(customer, other_bike, date(10)).unwrap();
    ledger.pay_for_hire(overdue).unwrap();
    ledger.pay_for_hire(on_time).unwrap();

    ledger.set_clock(FixedClock(date(4)));

    assert_eq!(ledger.refresh_late_hires(), 1);
    assert_eq!(ledger.refresh_late_hires(), 0);
    assert_eq!(hire_state(&ledger, overdue), HireState::Late);
    assert_eq!(hire_state(&ledger, on_time), HireState::Active);
}

// =============================================================================
// Cascades
// =============================================================================

#[test]
fn payment_stands_when_bike_is_not_available() {
    let (mut ledger, customer, bike) = setup();
    let first = ledger.add_hire(customer, bike, date(5)).unwrap();
    let second = ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.pay_for_hire(first).unwrap();

    // bike already on hire: the collect is refused, the payment is not
    assert!(ledger.pay_for_hire(second).unwrap());

    assert_eq!(hire_state(&ledger, second), HireState::Active);
    assert_eq!(bike_state(&ledger, bike), BikeState::OnHire);
}

#[test]
fn hires_are_found_by_bike_and_customer() {
    let (mut ledger, customer, bike) = setup();
    let other = ledger.add_customer(make_customer("Nicky"));
    ledger.add_hire(customer, bike, date(5)).unwrap();
    ledger.add_hire(other, bike, date(9)).unwrap();

    assert_eq!(ledger.hires_for_bike(bike).count(), 2);
    assert_eq!(ledger.hires_for_customer(customer).count(), 1);
    assert_eq!(ledger.hires_for_customer(other).count(), 1);
}
