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

//! Ledger persistence.
//!
//! The whole ledger is saved as one JSON snapshot. Entities refer to each other
//! by sequence number, so a hire stores its customer and bike as plain numbers;
//! loading re-links them by checking every reference resolves before any
//! ledger is handed out. A snapshot that fails to read, parse or re-link
//! yields an error and never a partially restored ledger.
//!
//! Saves write a sibling temporary file and rename it over the snapshot, so an
//! interrupted save leaves the previous snapshot intact.

use crate::bike::Bike;
use crate::clock::Clock;
use crate::customer::Customer;
use crate::error::StoreError;
use crate::hire::Hire;
use crate::invoice::{InvoiceIn, InvoiceOut};
use crate::ledger::{Ledger, LedgerParts};
use crate::registry::{EntityKind, Sequenced};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Snapshot layout version written by this build.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    customers: &'a [Customer],
    bikes: &'a [Bike],
    hires: &'a [Hire],
    invoices_out: &'a [InvoiceOut],
    invoices_in: &'a [InvoiceIn],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    customers: Vec<Customer>,
    bikes: Vec<Bike>,
    hires: Vec<Hire>,
    invoices_out: Vec<InvoiceOut>,
    invoices_in: Vec<InvoiceIn>,
}

/// A ledger snapshot file.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the complete ledger, replacing any previous snapshot.
    ///
    /// The ledger itself is never modified, whether or not the save succeeds.
    /// A failed save leaves neither a temporary file nor a partial snapshot.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Io`] - The snapshot could not be written or moved into place.
    pub fn save(&self, ledger: &Ledger) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(parent, source))?;
        }

        let snapshot = SnapshotRef {
            version: FORMAT_VERSION,
            customers: ledger.customers(),
            bikes: ledger.bikes(),
            hires: ledger.hires(),
            invoices_out: ledger.invoices_out(),
            invoices_in: ledger.invoices_in(),
        };

        let temp_path = self.temp_path();
        let written = File::create(&temp_path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writer.flush()
        });
        if let Err(source) = written {
            discard(&temp_path);
            return Err(self.io_error(&temp_path, source));
        }

        if let Err(source) = fs::rename(&temp_path, &self.path) {
            discard(&temp_path);
            return Err(self.io_error(&self.path, source));
        }

        info!(
            path = %self.path.display(),
            customers = ledger.customers().len(),
            bikes = ledger.bikes().len(),
            hires = ledger.hires().len(),
            "ledger saved"
        );
        Ok(())
    }

    /// Reads and re-links a snapshot into a ledger dated by `clock`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] - Nothing has been saved at this path.
    /// - [`StoreError::Io`] - The file could not be read.
    /// - [`StoreError::Format`] - The file is not a ledger snapshot.
    /// - [`StoreError::UnsupportedVersion`] - Written by an incompatible build.
    /// - [`StoreError::OutOfSequence`] - Identifiers are not strictly increasing.
    /// - [`StoreError::SequenceExhausted`] - No identifier is left for a new entity.
    /// - [`StoreError::DanglingReference`] - A hire or invoice refers to a missing entity.
    pub fn load(&self, clock: impl Clock + 'static) -> Result<Ledger, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(source) => return Err(self.io_error(&self.path, source)),
        };

        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
        if snapshot.version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(snapshot.version));
        }

        let parts = LedgerParts {
            customers: snapshot.customers,
            bikes: snapshot.bikes,
            hires: snapshot.hires,
            invoices_out: snapshot.invoices_out,
            invoices_in: snapshot.invoices_in,
        };
        relink(&parts)?;

        info!(
            path = %self.path.display(),
            customers = parts.customers.len(),
            bikes = parts.bikes.len(),
            hires = parts.hires.len(),
            "ledger loaded"
        );
        Ok(Ledger::from_parts(parts, Box::new(clock)))
    }

    /// Loads the snapshot, or starts an empty ledger if it cannot be loaded.
    pub fn load_or_default<C: Clock + Clone + 'static>(&self, clock: C) -> Ledger {
        match self.load(clock.clone()) {
            Ok(ledger) => ledger,
            Err(StoreError::NotFound(_)) => {
                info!(path = %self.path.display(), "no saved ledger, starting empty");
                Ledger::with_clock(clock)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not load ledger, starting empty");
                Ledger::with_clock(clock)
            }
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> StoreError {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Removes a temporary file left by a failed save.
fn discard(temp_path: &Path) {
    if let Err(e) = fs::remove_file(temp_path) {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %temp_path.display(), error = %e, "could not remove temporary snapshot");
        }
    }
}

/// Checks ordering and cross-references of restored collections.
fn relink(parts: &LedgerParts) -> Result<(), StoreError> {
    let customers = sequences(&parts.customers, EntityKind::Customer)?;
    let bikes = sequences(&parts.bikes, EntityKind::Bike)?;
    let hires = sequences(&parts.hires, EntityKind::Hire)?;
    sequences(&parts.invoices_out, EntityKind::InvoiceOut)?;
    sequences(&parts.invoices_in, EntityKind::InvoiceIn)?;

    let dangling = |owner: String, kind: EntityKind, sequence: u32| StoreError::DanglingReference {
        owner,
        kind,
        sequence,
    };

    for hire in &parts.hires {
        if !customers.contains(&hire.customer().sequence()) {
            return Err(dangling(hire.id().to_string(), EntityKind::Customer, hire.customer().sequence()));
        }
        if !bikes.contains(&hire.bike().sequence()) {
            return Err(dangling(hire.id().to_string(), EntityKind::Bike, hire.bike().sequence()));
        }
    }

    for invoice in &parts.invoices_out {
        if !hires.contains(&invoice.hire().sequence()) {
            return Err(dangling(invoice.id().to_string(), EntityKind::Hire, invoice.hire().sequence()));
        }
    }

    for invoice in &parts.invoices_in {
        if !hires.contains(&invoice.hire().sequence()) {
            return Err(dangling(invoice.id().to_string(), EntityKind::Hire, invoice.hire().sequence()));
        }
    }

    Ok(())
}

/// Collects sequence numbers, requiring them to start at 1 or above, rise
/// strictly and leave room for one more.
fn sequences<T: Sequenced>(items: &[T], kind: EntityKind) -> Result<HashSet<u32>, StoreError> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut previous = 0;

    for item in items {
        let sequence = item.sequence();
        if sequence <= previous {
            return Err(StoreError::OutOfSequence { kind, sequence });
        }
        if sequence == u32::MAX {
            return Err(StoreError::SequenceExhausted { kind, sequence });
        }
        previous = sequence;
        seen.insert(sequence);
    }

    Ok(seen)
}
