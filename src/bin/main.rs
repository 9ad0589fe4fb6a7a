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

use anyhow::{Context, Result, anyhow, bail, ensure};
use bike_hire_ledger::invoice::format_pounds;
use bike_hire_ledger::{
    Bike, BikeId, BikeState, CustomerId, FixedClock, HireId, InvoiceInId, InvoiceOutId, Ledger,
    LedgerStore, NewBike, NewCustomer, StoreError, SystemClock, demo,
};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Bike Hire - Run a bike hire shop from the command line
///
/// Keeps customers, bikes, hires and invoices in a JSON ledger file. Every
/// invocation loads the ledger, checks active hires for lateness, runs one
/// command and saves the ledger again.
#[derive(Parser, Debug)]
#[command(name = "bike-hire")]
#[command(about = "Bike hire ledger: fleet, hires, invoices and reports", long_about = None)]
struct Cli {
    /// Path to the ledger file
    #[arg(long, env = "BIKE_HIRE_DATA", default_value = "bike_hire_data.json")]
    data_file: PathBuf,

    /// Treat this date (YYYY-MM-DD) as today instead of the system date
    #[arg(long, env = "BIKE_HIRE_TODAY", value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Run the command without saving the ledger
    #[arg(long)]
    dry_run: bool,

    /// Log more detail to stderr (-v info, -vv debug). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register and list customers
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Manage the fleet
    #[command(subcommand)]
    Bike(BikeCommand),
    /// Book, pay for and return hires
    #[command(subcommand)]
    Hire(HireCommand),
    /// List and print invoices
    #[command(subcommand)]
    Invoice(InvoiceCommand),
    /// Print fleet and hire statistics
    Report {
        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// Append demonstration customers, bikes and hires
    Seed,
}

#[derive(Subcommand, Debug)]
enum CustomerCommand {
    Add(CustomerArgs),
    List,
}

#[derive(Args, Debug)]
struct CustomerArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    /// First line of the address
    #[arg(long)]
    address: String,
    #[arg(long)]
    town: String,
    #[arg(long)]
    postcode: String,
}

#[derive(Subcommand, Debug)]
enum BikeCommand {
    Add(BikeArgs),
    List,
    /// Add bikes from a CSV file
    ///
    /// Expected format: make,model,function,demographic,colour,daily_rate,deposit
    Import {
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
    /// Mark a damaged bike as repaired
    Repair { bike: BikeId },
}

#[derive(Args, Debug)]
struct BikeArgs {
    #[arg(long)]
    make: String,
    #[arg(long)]
    model: String,
    /// Racing, mountain, BMX, ...
    #[arg(long)]
    function: String,
    /// Men, women, girl, boy, ...
    #[arg(long)]
    demographic: String,
    #[arg(long)]
    colour: String,
    #[arg(long)]
    daily_rate: Decimal,
    #[arg(long)]
    deposit: Decimal,
}

#[derive(Subcommand, Debug)]
enum HireCommand {
    /// Book a hire and issue its outbound invoice
    Create {
        #[arg(long)]
        customer: CustomerId,
        #[arg(long)]
        bike: BikeId,
        /// Agreed return date (YYYY-MM-DD), after today
        #[arg(long, value_name = "DATE")]
        end_date: NaiveDate,
        /// Take payment straight away
        #[arg(long)]
        pay: bool,
    },
    /// Take payment for a booked hire
    Pay { hire: HireId },
    /// Return a hire and issue its inbound invoice
    Return {
        hire: HireId,
        /// The bike came back damaged; the deposit is kept
        #[arg(long)]
        damaged: bool,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum InvoiceCommand {
    /// List invoices issued at booking
    ListOut,
    /// List invoices issued at return
    ListIn,
    /// Print one invoice (INV-OUT-<n> or INV-IN-<n>)
    Show { invoice: String },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let store = LedgerStore::new(&cli.data_file);
    let (mut ledger, can_save) = open_ledger(&store, cli.today);

    let newly_late = ledger.refresh_late_hires();
    let changed = execute(&mut ledger, cli.command, std::io::stdout())?;

    if (changed || newly_late > 0) && !cli.dry_run {
        ensure!(
            can_save,
            "refusing to overwrite unreadable ledger {}",
            store.path().display()
        );
        store
            .save(&ledger)
            .with_context(|| format!("saving ledger to {}", store.path().display()))?;
    }
    Ok(())
}

/// Loads the ledger, starting empty if there is none or it cannot be read.
///
/// The flag is `false` when an existing file could not be loaded, so that it is
/// not overwritten by the empty ledger.
fn open_ledger(store: &LedgerStore, today: Option<NaiveDate>) -> (Ledger, bool) {
    let loaded = match today {
        Some(date) => store.load(FixedClock(date)),
        None => store.load(SystemClock),
    };
    let empty = || match today {
        Some(date) => Ledger::with_clock(FixedClock(date)),
        None => Ledger::new(),
    };

    match loaded {
        Ok(ledger) => (ledger, true),
        Err(StoreError::NotFound(_)) => {
            debug!(path = %store.path().display(), "starting a new ledger");
            (empty(), true)
        }
        Err(e) => {
            warn!(error = %e, "could not load ledger, continuing with an empty one");
            (empty(), false)
        }
    }
}

/// Runs one command. Returns whether the ledger was modified.
fn execute<W: Write>(ledger: &mut Ledger, command: Command, out: W) -> Result<bool> {
    match command {
        Command::Customer(CustomerCommand::Add(args)) => {
            let details = args.into_new_customer()?;
            let id = ledger.add_customer(details);
            report_line(out, format_args!("Registered {id}"))?;
            Ok(true)
        }
        Command::Customer(CustomerCommand::List) => {
            let rows = ledger.customers().iter().map(|customer| CustomerRow {
                customer: customer.id().to_string(),
                name: customer.full_name(),
                address: customer.address(),
                hires: ledger.hires_for_customer(customer.id()).count(),
            });
            write_rows(out, rows)?;
            Ok(false)
        }
        Command::Bike(BikeCommand::Add(args)) => {
            let details = args.into_new_bike()?;
            let id = ledger.add_bike(details);
            report_line(out, format_args!("Added {id}"))?;
            Ok(true)
        }
        Command::Bike(BikeCommand::List) => {
            write_rows(out, ledger.bikes().iter().map(BikeRow::from))?;
            Ok(false)
        }
        Command::Bike(BikeCommand::Import { input }) => {
            let file = File::open(&input)
                .with_context(|| format!("opening '{}'", input.display()))?;
            let added = import_bikes(ledger, BufReader::new(file))
                .with_context(|| format!("reading '{}'", input.display()))?;
            report_line(out, format_args!("Imported {added} bikes"))?;
            Ok(added > 0)
        }
        Command::Bike(BikeCommand::Repair { bike }) => {
            if !ledger.repair_bike(bike)? {
                bail!("{bike} is not damaged");
            }
            report_line(out, format_args!("{bike} repaired"))?;
            Ok(true)
        }
        Command::Hire(HireCommand::Create {
            customer,
            bike,
            end_date,
            pay,
        }) => {
            check_bookable(ledger, bike, end_date)?;
            let (hire, invoice) = ledger.book_hire(customer, bike, end_date)?;
            if pay {
                ledger.pay_for_hire(hire)?;
            }
            let total = ledger
                .invoice_out(invoice)
                .map(|invoice| invoice.total())
                .unwrap_or_default();
            report_line(
                out,
                format_args!("Booked {hire} ({invoice}, total {})", format_pounds(total)),
            )?;
            Ok(true)
        }
        Command::Hire(HireCommand::Pay { hire }) => {
            if !ledger.pay_for_hire(hire)? {
                bail!("{hire} is not awaiting payment");
            }
            report_line(out, format_args!("{hire} paid"))?;
            Ok(true)
        }
        Command::Hire(HireCommand::Return { hire, damaged }) => {
            let invoice = ledger
                .check_in(hire, damaged)?
                .ok_or_else(|| anyhow!("{hire} is not out on hire"))?;
            let late_fee = ledger.late_fee(invoice)?;
            report_line(
                out,
                format_args!("{hire} returned ({invoice}, late fee {})", format_pounds(late_fee)),
            )?;
            Ok(true)
        }
        Command::Hire(HireCommand::List) => {
            let today = ledger.today();
            let rows: Vec<HireRow> = ledger
                .hires()
                .iter()
                .map(|hire| HireRow {
                    hire: hire.id().to_string(),
                    customer: hire.customer().to_string(),
                    bike: hire.bike().to_string(),
                    start_date: hire.start_date(),
                    end_date: hire.end_date(),
                    date_returned: hire.date_returned(),
                    days_late: hire.days_late(today),
                    cost: ledger.hire_cost(hire.id()).unwrap_or_default().round_dp(2),
                    status: hire.status(),
                })
                .collect();
            write_rows(out, rows)?;
            Ok(false)
        }
        Command::Invoice(InvoiceCommand::ListOut) => {
            let rows = ledger.invoices_out().iter().map(|invoice| InvoiceOutRow {
                invoice: invoice.id().to_string(),
                hire: invoice.hire().to_string(),
                issued_on: invoice.issued_on(),
                cost: invoice.cost().round_dp(2),
                deposit: invoice.deposit().round_dp(2),
                total: invoice.total().round_dp(2),
            });
            write_rows(out, rows)?;
            Ok(false)
        }
        Command::Invoice(InvoiceCommand::ListIn) => {
            let rows: Vec<InvoiceInRow> = ledger
                .invoices_in()
                .iter()
                .map(|invoice| InvoiceInRow {
                    invoice: invoice.id().to_string(),
                    hire: invoice.hire().to_string(),
                    issued_on: invoice.issued_on(),
                    bike_damaged: invoice.was_bike_damaged(),
                    late_fee: ledger.late_fee(invoice.id()).unwrap_or_default().round_dp(2),
                })
                .collect();
            write_rows(out, rows)?;
            Ok(false)
        }
        Command::Invoice(InvoiceCommand::Show { invoice }) => {
            let document = if let Ok(id) = invoice.parse::<InvoiceOutId>() {
                ledger.render_invoice_out(id)?
            } else {
                ledger.render_invoice_in(invoice.parse::<InvoiceInId>()?)?
            };
            report_line(out, format_args!("{document}"))?;
            Ok(false)
        }
        Command::Report { json } => {
            let summary = ledger.report().summary();
            if json {
                let mut out = out;
                serde_json::to_writer_pretty(&mut out, &summary)?;
                writeln!(out)?;
            } else {
                write_rows(out, [summary])?;
            }
            Ok(false)
        }
        Command::Seed => {
            demo::seed(ledger)?;
            report_line(
                out,
                format_args!(
                    "Seeded ledger: {} customers, {} bikes, {} hires",
                    ledger.customers().len(),
                    ledger.bikes().len(),
                    ledger.hires().len()
                ),
            )?;
            Ok(true)
        }
    }
}

fn report_line<W: Write>(mut out: W, message: std::fmt::Arguments<'_>) -> Result<()> {
    writeln!(out, "{message}")?;
    Ok(())
}

// === Input validation ===

fn require_text(field: &str, value: String) -> Result<String> {
    let value = value.trim().to_string();
    ensure!(!value.is_empty(), "{field} must not be empty");
    Ok(value)
}

fn require_positive(field: &str, value: Decimal) -> Result<Decimal> {
    ensure!(value > Decimal::ZERO, "{field} must be greater than zero");
    Ok(value)
}

impl CustomerArgs {
    fn into_new_customer(self) -> Result<NewCustomer> {
        Ok(NewCustomer {
            first_name: require_text("first name", self.first_name)?,
            last_name: require_text("last name", self.last_name)?,
            address_line1: require_text("address", self.address)?,
            town: require_text("town", self.town)?,
            postcode: require_text("postcode", self.postcode)?.to_uppercase(),
        })
    }
}

impl BikeArgs {
    fn into_new_bike(self) -> Result<NewBike> {
        Ok(NewBike {
            make: require_text("make", self.make)?,
            model: require_text("model", self.model)?,
            function: require_text("function", self.function)?,
            demographic: require_text("demographic", self.demographic)?,
            colour: require_text("colour", self.colour)?,
            daily_rate: require_positive("daily rate", self.daily_rate)?,
            deposit: require_positive("deposit", self.deposit)?,
        })
    }
}

/// A hire can only be booked on an available bike and must end after today.
fn check_bookable(ledger: &Ledger, bike: BikeId, end_date: NaiveDate) -> Result<()> {
    let today = ledger.today();
    ensure!(
        end_date > today,
        "end date {end_date} must be after today ({today})"
    );

    let state = ledger
        .bike(bike)
        .map(|bike| bike.state())
        .ok_or_else(|| anyhow!("bike {bike} not found"))?;
    ensure!(
        state == BikeState::Available,
        "{bike} is not available for hire ({state})"
    );
    Ok(())
}

// === CSV import ===

/// Raw CSV record matching the bike import format.
///
/// Fields: `make, model, function, demographic, colour, daily_rate, deposit`
#[derive(Debug, Deserialize)]
struct BikeRecord {
    make: String,
    model: String,
    function: String,
    demographic: String,
    colour: String,
    daily_rate: Decimal,
    deposit: Decimal,
}

impl BikeRecord {
    fn into_new_bike(self) -> Result<NewBike> {
        BikeArgs {
            make: self.make,
            model: self.model,
            function: self.function,
            demographic: self.demographic,
            colour: self.colour,
            daily_rate: self.daily_rate,
            deposit: self.deposit,
        }
        .into_new_bike()
    }
}

/// Adds bikes from a CSV reader.
///
/// Rows are streamed, so large files are not loaded into memory. Malformed
/// rows and rows failing validation are skipped with a warning; an unreadable
/// header or a read failure stops the import.
///
/// # Example
///
/// ```csv
/// make,model,function,demographic,colour,daily_rate,deposit
/// Scott,Ransom,mountain,men,silver,30,50
/// Alliant,XPRESS Pro,BMX,boy,chrome,12.70,20
/// ```
///
/// # Errors
///
/// Returns a CSV error if the header cannot be read or the underlying reader
/// fails. Bikes added before a read failure stay in the ledger.
fn import_bikes<R: Read>(ledger: &mut Ledger, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    rdr.headers()?;

    let mut added = 0;
    for (row, result) in rdr.deserialize::<BikeRecord>().enumerate() {
        let line = row + 2;
        let record = match result {
            Err(e) if e.is_io_error() => return Err(e),
            other => other,
        };
        match record.map_err(anyhow::Error::from).and_then(BikeRecord::into_new_bike) {
            Ok(details) => {
                ledger.add_bike(details);
                added += 1;
            }
            Err(e) => {
                warn!(line, error = %e, "skipping bike row");
            }
        }
    }

    Ok(added)
}

// === CSV output ===

#[derive(Debug, Serialize)]
struct CustomerRow {
    customer: String,
    name: String,
    address: String,
    hires: usize,
}

#[derive(Debug, Serialize)]
struct BikeRow {
    bike: String,
    description: String,
    daily_rate: Decimal,
    deposit: Decimal,
    status: &'static str,
}

impl From<&Bike> for BikeRow {
    fn from(bike: &Bike) -> Self {
        BikeRow {
            bike: bike.id().to_string(),
            description: bike.description(),
            daily_rate: bike.daily_rate().round_dp(2),
            deposit: bike.deposit().round_dp(2),
            status: bike.status(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HireRow {
    hire: String,
    customer: String,
    bike: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    date_returned: Option<NaiveDate>,
    days_late: i64,
    cost: Decimal,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct InvoiceOutRow {
    invoice: String,
    hire: String,
    issued_on: NaiveDate,
    cost: Decimal,
    deposit: Decimal,
    total: Decimal,
}

#[derive(Debug, Serialize)]
struct InvoiceInRow {
    invoice: String,
    hire: String,
    issued_on: NaiveDate,
    bike_damaged: bool,
    late_fee: Decimal,
}

/// Writes serializable rows as CSV with a header line.
fn write_rows<W: Write, T: Serialize>(
    writer: W,
    rows: impl IntoIterator<Item = T>,
) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for row in rows {
        wtr.serialize(row)?;
    }

    // Flush to ensure all data is written
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bike_hire_ledger::HireState;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ledger() -> Ledger {
        Ledger::with_clock(FixedClock(date("2025-03-10")))
    }

    fn run_command(ledger: &mut Ledger, args: &[&str]) -> Result<(bool, String)> {
        let cli = Cli::try_parse_from(std::iter::once("bike-hire").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        let changed = execute(ledger, cli.command, &mut out)?;
        Ok((changed, String::from_utf8(out).unwrap()))
    }

    fn sample_bikes(ledger: &mut Ledger) {
        let csv = "make,model,function,demographic,colour,daily_rate,deposit\n\
                   Scott,Ransom,mountain,men,silver,30,50\n\
                   Alliant,XPRESS Pro,BMX,boy,chrome,12.70,20\n";
        import_bikes(ledger, Cursor::new(csv)).unwrap();
    }

    #[test]
    fn import_simple_bikes() {
        let mut ledger = ledger();
        sample_bikes(&mut ledger);

        assert_eq!(ledger.bikes().len(), 2);
        let bike = ledger.bike(BikeId(2)).unwrap();
        assert_eq!(bike.model(), "XPRESS Pro");
        assert_eq!(bike.daily_rate(), dec!(12.70));
    }

    #[test]
    fn import_with_whitespace() {
        let csv = "make, model, function, demographic, colour, daily_rate, deposit\n\
                   Scott , Ransom , mountain , men , silver , 30.00 , 50.00\n";
        let mut ledger = ledger();

        let added = import_bikes(&mut ledger, Cursor::new(csv)).unwrap();

        assert_eq!(added, 1);
        assert_eq!(ledger.bikes()[0].make(), "Scott");
        assert_eq!(ledger.bikes()[0].deposit(), dec!(50.00));
    }

    #[test]
    fn import_skips_malformed_rows() {
        let csv = "make,model,function,demographic,colour,daily_rate,deposit\n\
                   Scott,Ransom,mountain,men,silver,thirty,50\n\
                   ,Ransom,mountain,men,silver,30,50\n\
                   Scott,Ransom,mountain,men,silver,-1,50\n\
                   Scott,Ransom,mountain\n\
                   Raleigh,Pioneer,hybrid,women,blue,15,25\n";
        let mut ledger = ledger();

        let added = import_bikes(&mut ledger, Cursor::new(csv)).unwrap();

        assert_eq!(added, 1);
        assert_eq!(ledger.bikes()[0].id(), BikeId(1));
        assert_eq!(ledger.bikes()[0].make(), "Raleigh");
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk gone"))
        }
    }

    #[test]
    fn import_stops_on_read_failure() {
        let mut ledger = ledger();

        let err = import_bikes(&mut ledger, FailingReader).unwrap_err();

        assert!(err.is_io_error());
        assert!(ledger.bikes().is_empty());
    }

    #[test]
    fn import_rejects_unreadable_header() {
        let csv: &[u8] = b"make,\xffmodel,function\nScott,Ransom,mountain\n";
        let mut ledger = ledger();

        assert!(import_bikes(&mut ledger, Cursor::new(csv)).is_err());
        assert!(ledger.bikes().is_empty());
    }

    #[test]
    fn write_rows_has_header() {
        let mut ledger = ledger();
        sample_bikes(&mut ledger);

        let mut out = Vec::new();
        write_rows(&mut out, ledger.bikes().iter().map(BikeRow::from)).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("bike,description,daily_rate,deposit,status")
        );
        assert_eq!(
            lines.next(),
            Some("BIKE1,\"Scott Ransom, men's mountain bike in silver\",30,50,Available")
        );
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn customer_add_trims_and_validates() {
        let mut ledger = ledger();

        let (changed, out) = run_command(
            &mut ledger,
            &[
                "customer", "add", "--first-name", " Jane ", "--last-name", "North",
                "--address", "1 High Street", "--town", "Leeds", "--postcode", "ls1 1aa",
            ],
        )
        .unwrap();

        assert!(changed);
        assert_eq!(out.trim(), "Registered CUST1");
        assert_eq!(ledger.customers()[0].first_name(), "Jane");
        assert_eq!(ledger.customers()[0].postcode(), "LS1 1AA");

        let err = run_command(
            &mut ledger,
            &[
                "customer", "add", "--first-name", "", "--last-name", "North",
                "--address", "1 High Street", "--town", "Leeds", "--postcode", "LS1",
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("first name"));
        assert_eq!(ledger.customers().len(), 1);
    }

    #[test]
    fn bike_add_rejects_non_positive_rate() {
        let mut ledger = ledger();

        let err = run_command(
            &mut ledger,
            &[
                "bike", "add", "--make", "Scott", "--model", "Ransom", "--function", "mountain",
                "--demographic", "men", "--colour", "silver", "--daily-rate", "0",
                "--deposit", "50",
            ],
        )
        .unwrap_err();

        assert!(err.to_string().contains("daily rate"));
        assert!(ledger.bikes().is_empty());
    }

    #[test]
    fn hire_lifecycle_through_commands() {
        let mut ledger = ledger();
        sample_bikes(&mut ledger);
        run_command(
            &mut ledger,
            &[
                "customer", "add", "--first-name", "Jane", "--last-name", "North",
                "--address", "1 High Street", "--town", "Leeds", "--postcode", "LS1 1AA",
            ],
        )
        .unwrap();

        let (_, out) = run_command(
            &mut ledger,
            &[
                "hire", "create", "--customer", "CUST1", "--bike", "BIKE1",
                "--end-date", "2025-03-12", "--pay",
            ],
        )
        .unwrap();
        assert_eq!(out.trim(), "Booked HIRE1 (INV-OUT-1, total £110.00)");
        assert_eq!(ledger.hire(HireId(1)).unwrap().state(), HireState::Active);

        // the bike is out, so it cannot be booked again
        let err = run_command(
            &mut ledger,
            &[
                "hire", "create", "--customer", "CUST1", "--bike", "BIKE1",
                "--end-date", "2025-03-20",
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("not available"));

        ledger.set_clock(FixedClock(date("2025-03-14")));
        let (_, out) = run_command(&mut ledger, &["hire", "return", "HIRE1"]).unwrap();
        assert_eq!(out.trim(), "HIRE1 returned (INV-IN-1, late fee £90.00)");

        let (changed, out) = run_command(&mut ledger, &["hire", "list"]).unwrap();
        assert!(!changed);
        assert!(out.contains("HIRE1,CUST1,BIKE1,2025-03-10,2025-03-12,2025-03-14,2,60,Complete (late)"));
    }

    #[test]
    fn hire_create_rejects_past_end_date() {
        let mut ledger = ledger();
        sample_bikes(&mut ledger);

        let err = run_command(
            &mut ledger,
            &[
                "hire", "create", "--customer", "CUST1", "--bike", "BIKE1",
                "--end-date", "2025-03-10",
            ],
        )
        .unwrap_err();

        assert!(err.to_string().contains("must be after today"));
        assert!(ledger.hires().is_empty());
    }

    #[test]
    fn invalid_id_is_rejected_by_parser() {
        let mut ledger = ledger();
        assert!(run_command(&mut ledger, &["hire", "pay", "BIKE1"]).is_err());
    }

    #[test]
    fn report_on_empty_ledger() {
        let mut ledger = ledger();

        let (changed, out) = run_command(&mut ledger, &["report", "--json"]).unwrap();

        assert!(!changed);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["most_popular_bike"], "N/A");
        assert_eq!(value["total_bikes"], 0);
    }

    #[test]
    fn seed_then_show_invoice() {
        let mut ledger = ledger();
        run_command(&mut ledger, &["seed"]).unwrap();

        let (_, out) = run_command(&mut ledger, &["invoice", "show", "INV-OUT-1"]).unwrap();
        assert!(out.contains("INVOICE"));

        let (_, out) = run_command(&mut ledger, &["invoice", "show", "INV-IN-1"]).unwrap();
        assert!(out.contains("INVOICE"));

        assert!(run_command(&mut ledger, &["invoice", "show", "HIRE1"]).is_err());
    }
}
