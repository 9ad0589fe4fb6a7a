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

//! The bike hire ledger.
//!
//! The [`Ledger`] owns every customer, bike, hire and invoice of a session, in
//! the order they were created. It assigns identifiers, routes hire
//! operations to the bike they concern, and issues invoices.
//!
//! There is one ledger per session. It is created by the application entry
//! point (empty, seeded, or restored by [`LedgerStore`](crate::LedgerStore))
//! and passed explicitly to whatever needs it.

use crate::base::{BikeId, CustomerId, HireId, InvoiceInId, InvoiceOutId};
use crate::bike::{Bike, NewBike};
use crate::clock::{Clock, SystemClock};
use crate::customer::{Customer, NewCustomer};
use crate::error::LedgerError;
use crate::hire::{Hire, HireState};
use crate::invoice::{InvoiceIn, InvoiceOut};
use crate::registry::{self, EntityKind};
use crate::report::Report;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, info};

/// Position of each entity in its collection, keyed by identifier.
#[derive(Debug, Default)]
struct Index {
    customers: HashMap<CustomerId, usize>,
    bikes: HashMap<BikeId, usize>,
    hires: HashMap<HireId, usize>,
    invoices_out: HashMap<InvoiceOutId, usize>,
    invoices_in: HashMap<InvoiceInId, usize>,
    /// Hires that already have an invoice of each kind.
    invoiced_out: HashSet<HireId>,
    invoiced_in: HashSet<HireId>,
}

fn positions<K: Eq + Hash, T>(items: &[T], key: impl Fn(&T) -> K) -> HashMap<K, usize> {
    items.iter().enumerate().map(|(i, item)| (key(item), i)).collect()
}

/// All customers, bikes, hires and invoices of a session.
///
/// # Invariants
///
/// - Collections are append-only and keep insertion order.
/// - Sequence numbers are strictly increasing within each collection; a new
///   entity gets the last entity's number plus one.
/// - Every hire refers to a customer and a bike in this ledger, and every
///   invoice to a hire in this ledger.
/// - An inbound invoice is only issued after its hire's return has been
///   applied to the bike.
/// - A hire has at most one outbound and one inbound invoice.
#[derive(Debug)]
pub struct Ledger {
    customers: Vec<Customer>,
    bikes: Vec<Bike>,
    hires: Vec<Hire>,
    invoices_out: Vec<InvoiceOut>,
    invoices_in: Vec<InvoiceIn>,
    index: Index,
    clock: Box<dyn Clock>,
}

/// The five collections of a ledger, without indexes or clock.
#[derive(Debug, Default)]
pub(crate) struct LedgerParts {
    pub customers: Vec<Customer>,
    pub bikes: Vec<Bike>,
    pub hires: Vec<Hire>,
    pub invoices_out: Vec<InvoiceOut>,
    pub invoices_in: Vec<InvoiceIn>,
}

impl Ledger {
    /// Creates an empty ledger dated by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty ledger dated by `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::from_parts(LedgerParts::default(), Box::new(clock))
    }

    /// Rebuilds a ledger from collections that have already been checked for
    /// ordering and dangling references.
    pub(crate) fn from_parts(parts: LedgerParts, clock: Box<dyn Clock>) -> Self {
        let index = Index {
            customers: positions(&parts.customers, Customer::id),
            bikes: positions(&parts.bikes, Bike::id),
            hires: positions(&parts.hires, Hire::id),
            invoices_out: positions(&parts.invoices_out, InvoiceOut::id),
            invoices_in: positions(&parts.invoices_in, InvoiceIn::id),
            invoiced_out: parts.invoices_out.iter().map(InvoiceOut::hire).collect(),
            invoiced_in: parts.invoices_in.iter().map(InvoiceIn::hire).collect(),
        };

        Self {
            customers: parts.customers,
            bikes: parts.bikes,
            hires: parts.hires,
            invoices_out: parts.invoices_out,
            invoices_in: parts.invoices_in,
            index,
            clock,
        }
    }

    /// Replaces the clock used for every date-dependent operation.
    pub fn set_clock(&mut self, clock: impl Clock + 'static) {
        self.clock = Box::new(clock);
    }

    /// Swaps in `clock`, handing back the one it replaces.
    pub(crate) fn replace_clock(&mut self, clock: Box<dyn Clock>) -> Box<dyn Clock> {
        std::mem::replace(&mut self.clock, clock)
    }

    /// Today's date according to the ledger's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Sequence number the next entity of `kind` will receive.
    pub fn next_sequence(&self, kind: EntityKind) -> u32 {
        match kind {
            EntityKind::Customer => registry::next_sequence(&self.customers),
            EntityKind::Bike => registry::next_sequence(&self.bikes),
            EntityKind::Hire => registry::next_sequence(&self.hires),
            EntityKind::InvoiceOut => registry::next_sequence(&self.invoices_out),
            EntityKind::InvoiceIn => registry::next_sequence(&self.invoices_in),
        }
    }

    // === Construction ===

    /// Registers a customer.
    pub fn add_customer(&mut self, details: NewCustomer) -> CustomerId {
        let id = CustomerId(self.next_sequence(EntityKind::Customer));
        let customer = Customer::new(id, details);
        info!(customer = %id, name = %customer.full_name(), "customer registered");

        self.index.customers.insert(id, self.customers.len());
        self.customers.push(customer);
        id
    }

    /// Adds a bike to the fleet. New bikes are available for hire.
    pub fn add_bike(&mut self, details: NewBike) -> BikeId {
        let id = BikeId(self.next_sequence(EntityKind::Bike));
        let bike = Bike::new(id, details);
        info!(bike = %id, description = %bike.description(), "bike added");

        self.index.bikes.insert(id, self.bikes.len());
        self.bikes.push(bike);
        id
    }

    /// Opens a hire starting today and ending on `end_date`, awaiting payment.
    ///
    /// `end_date` is not checked here; it must be after today.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::CustomerNotFound`] - No such customer.
    /// - [`LedgerError::BikeNotFound`] - No such bike.
    pub fn add_hire(
        &mut self,
        customer: CustomerId,
        bike: BikeId,
        end_date: NaiveDate,
    ) -> Result<HireId, LedgerError> {
        self.customer(customer)
            .ok_or(LedgerError::CustomerNotFound(customer))?;
        self.bike(bike).ok_or(LedgerError::BikeNotFound(bike))?;

        let id = HireId(self.next_sequence(EntityKind::Hire));
        let hire = Hire::new(id, customer, bike, self.today(), end_date);
        info!(hire = %id, %customer, %bike, start = %hire.start_date(), end = %end_date, "hire opened");

        self.index.hires.insert(id, self.hires.len());
        self.hires.push(hire);
        Ok(id)
    }

    /// Opens a hire and issues its outbound invoice.
    pub fn book_hire(
        &mut self,
        customer: CustomerId,
        bike: BikeId,
        end_date: NaiveDate,
    ) -> Result<(HireId, InvoiceOutId), LedgerError> {
        let hire = self.add_hire(customer, bike, end_date)?;
        let invoice = self.issue_invoice_out(hire)?;
        Ok((hire, invoice))
    }

    /// Issues the invoice charged when a hire is booked.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::HireNotFound`] - No such hire.
    /// - [`LedgerError::AlreadyInvoiced`] - The hire already has an outbound invoice.
    pub fn issue_invoice_out(&mut self, hire: HireId) -> Result<InvoiceOutId, LedgerError> {
        let (hire, bike) = self.hire_and_bike(hire)?;
        if self.index.invoiced_out.contains(&hire.id()) {
            return Err(LedgerError::AlreadyInvoiced {
                hire: hire.id(),
                kind: EntityKind::InvoiceOut,
            });
        }

        let id = InvoiceOutId(self.next_sequence(EntityKind::InvoiceOut));
        let invoice = InvoiceOut::new(id, hire, bike, self.today());
        info!(invoice = %id, hire = %hire.id(), total = %invoice.total(), "outbound invoice issued");

        self.index.invoiced_out.insert(invoice.hire());
        self.index.invoices_out.insert(id, self.invoices_out.len());
        self.invoices_out.push(invoice);
        Ok(id)
    }

    /// Issues the invoice settled when a hire is returned.
    ///
    /// Captures the bike's damage state as it is now, so the hire must already
    /// be complete. [`Ledger::check_in`] returns and issues in order.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::HireNotFound`] - No such hire.
    /// - [`LedgerError::HireNotReturned`] - The hire is not complete.
    /// - [`LedgerError::AlreadyInvoiced`] - The hire already has an inbound invoice.
    pub fn issue_invoice_in(&mut self, hire: HireId) -> Result<InvoiceInId, LedgerError> {
        let (hire, bike) = self.hire_and_bike(hire)?;
        if !hire.state().is_complete() {
            return Err(LedgerError::HireNotReturned(hire.id()));
        }
        if self.index.invoiced_in.contains(&hire.id()) {
            return Err(LedgerError::AlreadyInvoiced {
                hire: hire.id(),
                kind: EntityKind::InvoiceIn,
            });
        }

        let id = InvoiceInId(self.next_sequence(EntityKind::InvoiceIn));
        let invoice = InvoiceIn::new(id, hire, bike, self.today());
        info!(invoice = %id, hire = %hire.id(), damaged = invoice.was_bike_damaged(), "inbound invoice issued");

        self.index.invoiced_in.insert(invoice.hire());
        self.index.invoices_in.insert(id, self.invoices_in.len());
        self.invoices_in.push(invoice);
        Ok(id)
    }

    // === Hire lifecycle ===

    /// Takes payment for a hire, which releases the bike to the customer.
    ///
    /// Returns `false` if the hire is not awaiting payment.
    pub fn pay_for_hire(&mut self, hire: HireId) -> Result<bool, LedgerError> {
        let (hire, bike) = self.hire_and_bike_mut(hire)?;
        Ok(hire.pay_for_hire(bike))
    }

    /// Polls a hire for lateness, moving an overdue active hire to `Late`.
    pub fn is_late(&mut self, hire: HireId) -> Result<bool, LedgerError> {
        let today = self.today();
        let position = self.hire_position(hire)?;
        Ok(self.hires[position].is_late(today))
    }

    /// Brings a hire back today.
    ///
    /// Returns `false` if the hire is not out (unpaid or already complete).
    pub fn return_hire(&mut self, hire: HireId, damaged: bool) -> Result<bool, LedgerError> {
        let today = self.today();
        let (hire, bike) = self.hire_and_bike_mut(hire)?;
        Ok(hire.return_hire(bike, damaged, today))
    }

    /// Returns a hire and, if the return was accepted, issues its inbound invoice.
    pub fn check_in(
        &mut self,
        hire: HireId,
        damaged: bool,
    ) -> Result<Option<InvoiceInId>, LedgerError> {
        if !self.return_hire(hire, damaged)? {
            return Ok(None);
        }
        self.issue_invoice_in(hire).map(Some)
    }

    /// Polls every hire for lateness. Returns how many became late.
    pub fn refresh_late_hires(&mut self) -> usize {
        let today = self.today();
        let mut newly_late = 0;

        for hire in &mut self.hires {
            let was_late = hire.state() == HireState::Late;
            if hire.is_late(today) && !was_late && !hire.state().is_complete() {
                newly_late += 1;
            }
        }

        debug!(newly_late, %today, "late hires refreshed");
        newly_late
    }

    // === Bike operations ===

    pub fn collect_bike(&mut self, bike: BikeId) -> Result<bool, LedgerError> {
        Ok(self.bike_entry(bike)?.collect())
    }

    pub fn return_bike(&mut self, bike: BikeId, damaged: bool) -> Result<bool, LedgerError> {
        Ok(self.bike_entry(bike)?.return_bike(damaged))
    }

    /// Marks a damaged bike as repaired. Returns `false` if it is not damaged.
    pub fn repair_bike(&mut self, bike: BikeId) -> Result<bool, LedgerError> {
        Ok(self.bike_entry(bike)?.repair())
    }

    // === Money ===

    /// Hire charge for the agreed duration at the bike's current rate.
    pub fn hire_cost(&self, hire: HireId) -> Result<Decimal, LedgerError> {
        let (hire, bike) = self.hire_and_bike(hire)?;
        Ok(hire.cost(bike))
    }

    /// Late fee on an inbound invoice as of today.
    pub fn late_fee(&self, invoice: InvoiceInId) -> Result<Decimal, LedgerError> {
        let invoice = self
            .invoice_in(invoice)
            .ok_or(LedgerError::InvoiceInNotFound(invoice))?;
        let hire = self
            .hire(invoice.hire())
            .ok_or(LedgerError::HireNotFound(invoice.hire()))?;
        Ok(invoice.late_fee(hire, self.today()))
    }

    /// Printable outbound invoice.
    pub fn render_invoice_out(&self, invoice: InvoiceOutId) -> Result<String, LedgerError> {
        let invoice = self
            .invoice_out(invoice)
            .ok_or(LedgerError::InvoiceOutNotFound(invoice))?;
        let (hire, bike, customer) = self.hire_context(invoice.hire())?;
        Ok(invoice.render(customer, hire, bike))
    }

    /// Printable inbound invoice.
    pub fn render_invoice_in(&self, invoice: InvoiceInId) -> Result<String, LedgerError> {
        let invoice = self
            .invoice_in(invoice)
            .ok_or(LedgerError::InvoiceInNotFound(invoice))?;
        let (hire, bike, customer) = self.hire_context(invoice.hire())?;
        Ok(invoice.render(customer, hire, bike, self.today()))
    }

    // === Queries ===

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn bikes(&self) -> &[Bike] {
        &self.bikes
    }

    pub fn hires(&self) -> &[Hire] {
        &self.hires
    }

    pub fn invoices_out(&self) -> &[InvoiceOut] {
        &self.invoices_out
    }

    pub fn invoices_in(&self) -> &[InvoiceIn] {
        &self.invoices_in
    }

    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        lookup(&self.customers, &self.index.customers, &id)
    }

    pub fn bike(&self, id: BikeId) -> Option<&Bike> {
        lookup(&self.bikes, &self.index.bikes, &id)
    }

    pub fn hire(&self, id: HireId) -> Option<&Hire> {
        lookup(&self.hires, &self.index.hires, &id)
    }

    pub fn invoice_out(&self, id: InvoiceOutId) -> Option<&InvoiceOut> {
        lookup(&self.invoices_out, &self.index.invoices_out, &id)
    }

    pub fn invoice_in(&self, id: InvoiceInId) -> Option<&InvoiceIn> {
        lookup(&self.invoices_in, &self.index.invoices_in, &id)
    }

    /// Mutable access for editing contact details.
    pub fn customer_mut(&mut self, id: CustomerId) -> Option<&mut Customer> {
        let position = *self.index.customers.get(&id)?;
        self.customers.get_mut(position)
    }

    /// Mutable access for editing bike attributes or driving its state directly.
    pub fn bike_mut(&mut self, id: BikeId) -> Option<&mut Bike> {
        let position = *self.index.bikes.get(&id)?;
        self.bikes.get_mut(position)
    }

    /// Hires of `bike`, oldest first.
    pub fn hires_for_bike(&self, bike: BikeId) -> impl Iterator<Item = &Hire> + '_ {
        self.hires.iter().filter(move |hire| hire.bike() == bike)
    }

    /// Hires of `customer`, oldest first.
    pub fn hires_for_customer(&self, customer: CustomerId) -> impl Iterator<Item = &Hire> + '_ {
        self.hires.iter().filter(move |hire| hire.customer() == customer)
    }

    /// Aggregate statistics, computed on demand.
    pub fn report(&self) -> Report<'_> {
        Report::new(self)
    }

    // === Helpers ===

    fn hire_position(&self, hire: HireId) -> Result<usize, LedgerError> {
        self.index
            .hires
            .get(&hire)
            .copied()
            .ok_or(LedgerError::HireNotFound(hire))
    }

    fn bike_entry(&mut self, bike: BikeId) -> Result<&mut Bike, LedgerError> {
        self.bike_mut(bike).ok_or(LedgerError::BikeNotFound(bike))
    }

    fn hire_and_bike(&self, hire: HireId) -> Result<(&Hire, &Bike), LedgerError> {
        let hire = self.hire(hire).ok_or(LedgerError::HireNotFound(hire))?;
        let bike = self
            .bike(hire.bike())
            .ok_or(LedgerError::BikeNotFound(hire.bike()))?;
        Ok((hire, bike))
    }

    fn hire_and_bike_mut(&mut self, hire: HireId) -> Result<(&mut Hire, &mut Bike), LedgerError> {
        let hire_position = self.hire_position(hire)?;
        let bike = self.hires[hire_position].bike();
        let bike_position = *self
            .index
            .bikes
            .get(&bike)
            .ok_or(LedgerError::BikeNotFound(bike))?;
        Ok((&mut self.hires[hire_position], &mut self.bikes[bike_position]))
    }

    fn hire_context(&self, hire: HireId) -> Result<(&Hire, &Bike, &Customer), LedgerError> {
        let (hire, bike) = self.hire_and_bike(hire)?;
        let customer = self
            .customer(hire.customer())
            .ok_or(LedgerError::CustomerNotFound(hire.customer()))?;
        Ok((hire, bike, customer))
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<'a, K: Eq + Hash, T>(
    items: &'a [T],
    index: &HashMap<K, usize>,
    key: &K,
) -> Option<&'a T> {
    index.get(key).and_then(|&position| items.get(position))
}
