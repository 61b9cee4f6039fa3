use booking_workflow::application::engine::{BookingEngine, EnginePorts};
use booking_workflow::config::EngineConfig;
use booking_workflow::domain::ports::{BookingStoreBox, ClockBox, PaymentStoreBox, RequestBookingStoreBox};
use booking_workflow::infrastructure::authority::RoleBasedAuthority;
use booking_workflow::infrastructure::checkout::HostedCheckoutGateway;
use booking_workflow::infrastructure::clock::{FixedClock, SystemClock};
use booking_workflow::infrastructure::in_memory::{
    InMemoryBookingStore, InMemoryDirectory, InMemoryPaymentStore, InMemoryRequestBookingStore,
};
#[cfg(feature = "storage-rocksdb")]
use booking_workflow::infrastructure::rocksdb::RocksDBStore;
use booking_workflow::interfaces::api::handle_line;
use booking_workflow::interfaces::csv::directory_reader::{EmployeeReader, HotelReader};
use booking_workflow::interfaces::jsonl::RequestReader;
use chrono::NaiveDate;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input requests, one JSON object per line
    input: PathBuf,

    /// Employee directory CSV (id,name,company,email,role)
    #[arg(long)]
    employees: Option<PathBuf>,

    /// Hotel catalog CSV (id,name,city_code)
    #[arg(long)]
    hotels: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Shared secret for payment callback signatures
    #[arg(long, env = "BOOKING_WEBHOOK_SECRET", default_value = "", hide_env_values = true)]
    webhook_secret: String,

    /// Origin of hosted checkout pages
    #[arg(long, env = "BOOKING_CHECKOUT_URL", default_value = "https://checkout.local")]
    checkout_url: String,

    #[arg(long, env = "BOOKING_UPSTREAM_TIMEOUT_MS", default_value_t = 10_000)]
    upstream_timeout_ms: u64,

    #[arg(long, env = "BOOKING_LOCK_TIMEOUT_MS", default_value_t = 5_000)]
    lock_timeout_ms: u64,

    /// Pin the current date (YYYY-MM-DD) for reproducible runs
    #[arg(long)]
    today: Option<NaiveDate>,
}

struct Stores {
    bookings: BookingStoreBox,
    requests: RequestBookingStoreBox,
    payments: PaymentStoreBox,
}

fn in_memory_stores() -> Stores {
    Stores {
        bookings: Box::new(InMemoryBookingStore::new()),
        requests: Box::new(InMemoryRequestBookingStore::new()),
        payments: Box::new(InMemoryPaymentStore::new()),
    }
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    let Some(db_path) = db_path else {
        return Ok(in_memory_stores());
    };
    let store = RocksDBStore::open(db_path).into_diagnostic()?;
    Ok(Stores {
        bookings: Box::new(store.clone()),
        requests: Box::new(store.clone()),
        payments: Box::new(store),
    })
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        tracing::warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(in_memory_stores())
}

async fn load_directory(cli: &Cli) -> Result<InMemoryDirectory> {
    let directory = InMemoryDirectory::new();
    if let Some(path) = &cli.employees {
        let file = File::open(path).into_diagnostic()?;
        for employee in EmployeeReader::new(file).employees() {
            directory.add_employee(employee.into_diagnostic()?).await;
        }
    }
    if let Some(path) = &cli.hotels {
        let file = File::open(path).into_diagnostic()?;
        for hotel in HotelReader::new(file).hotels() {
            directory.add_hotel(hotel.into_diagnostic()?).await;
        }
    }
    Ok(directory)
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = EngineConfig::default()
        .with_webhook_secret(cli.webhook_secret.clone())
        .with_checkout_base_url(cli.checkout_url.clone())
        .with_upstream_timeout(Duration::from_millis(cli.upstream_timeout_ms))
        .with_lock_timeout(Duration::from_millis(cli.lock_timeout_ms));

    let directory = load_directory(&cli).await?;
    let stores = open_stores(cli.db_path.clone())?;
    let clock: ClockBox = match cli.today {
        Some(date) => Box::new(FixedClock::on(date)),
        None => Box::new(SystemClock),
    };
    let gateway = HostedCheckoutGateway::new(&config.checkout_base_url);

    let engine = BookingEngine::new(
        EnginePorts {
            bookings: stores.bookings,
            requests: stores.requests,
            payments: stores.payments,
            directory: Box::new(directory),
            authority: Box::new(RoleBasedAuthority),
            gateway: Box::new(gateway),
            clock,
        },
        config,
    );

    let file = File::open(&cli.input).into_diagnostic()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut handled = 0usize;
    for line in RequestReader::new(BufReader::new(file)).lines() {
        let line = line.into_diagnostic()?;
        let response = handle_line(&engine, &line).await;
        serde_json::to_writer(&mut out, &response).into_diagnostic()?;
        writeln!(out).into_diagnostic()?;
        handled += 1;
    }
    out.flush().into_diagnostic()?;
    info!(handled, "all requests processed");

    Ok(())
}
