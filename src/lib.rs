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

//! # Bike Hire Ledger
//!
//! This library models the day-to-day running of a bike hire shop: the fleet of
//! bikes, the customers who hire them, the hires themselves and the invoices
//! raised when a bike goes out and when it comes back.
//!
//! ## Core Components
//!
//! - [`Ledger`]: Owns every entity of a session and assigns sequential IDs
//! - [`Bike`]: Fleet bike with an `Available` / `OnHire` / `Damaged` lifecycle
//! - [`Hire`]: Hire with a `PaymentPending` / `Active` / `Late` / `Complete` lifecycle
//! - [`InvoiceOut`] / [`InvoiceIn`]: Invoices issued at booking and at return
//! - [`Report`]: Fleet and hire statistics computed on demand
//! - [`LedgerStore`]: JSON snapshot persistence of a whole ledger
//!
//! ## Example
//!
//! ```
//! use bike_hire_ledger::{BikeState, FixedClock, HireState, Ledger, NewBike, NewCustomer};
//! use chrono::{Days, NaiveDate};
//! use rust_decimal_macros::dec;
//!
//! let today = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
//! let mut ledger = Ledger::with_clock(FixedClock(today));
//!
//! let customer = ledger.add_customer(NewCustomer {
//!     first_name: "Jane".into(),
//!     last_name: "North".into(),
//!     address_line1: "5 Newton Road".into(),
//!     town: "Newton Longville".into(),
//!     postcode: "MK17 9GQ".into(),
//! });
//! let bike = ledger.add_bike(NewBike {
//!     make: "Giant".into(),
//!     model: "Areva 24".into(),
//!     function: "mountain".into(),
//!     demographic: "children".into(),
//!     colour: "blue".into(),
//!     daily_rate: dec!(15.25),
//!     deposit: dec!(20.50),
//! });
//!
//! // Book for four days and take payment
//! let (hire, invoice) = ledger.book_hire(customer, bike, today + Days::new(4)).unwrap();
//! assert_eq!(ledger.invoice_out(invoice).unwrap().total(), dec!(81.50));
//! assert!(ledger.pay_for_hire(hire).unwrap());
//! assert_eq!(ledger.bike(bike).unwrap().state(), BikeState::OnHire);
//!
//! // Returned two days late
//! ledger.set_clock(FixedClock(today + Days::new(6)));
//! let returned = ledger.check_in(hire, false).unwrap().unwrap();
//! assert_eq!(ledger.late_fee(returned).unwrap(), dec!(45.75));
//! assert!(matches!(ledger.hire(hire).unwrap().state(), HireState::Complete { .. }));
//! ```
//!
//! ## Threading
//!
//! A ledger is a plain single-owner value. Operations are synchronous and take
//! `&self` or `&mut self`; there is no internal locking.

mod base;
pub mod bike;
mod clock;
pub mod customer;
pub mod demo;
pub mod error;
pub mod hire;
pub mod invoice;
mod ledger;
pub mod registry;
pub mod report;
mod store;

pub use base::{BikeId, CustomerId, HireId, InvoiceInId, InvoiceOutId};
pub use bike::{Bike, BikeEvent, BikeState, NewBike};
pub use clock::{Clock, FixedClock, SystemClock};
pub use customer::{Customer, NewCustomer};
pub use error::{LedgerError, ParseIdError, StoreError};
pub use hire::{Hire, HireEvent, HireState};
pub use invoice::{InvoiceIn, InvoiceOut};
pub use ledger::Ledger;
pub use registry::EntityKind;
pub use report::{NOT_AVAILABLE, Report, ReportSummary};
pub use store::LedgerStore;
