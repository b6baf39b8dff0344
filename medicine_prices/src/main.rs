//! Medicine Prices - command-line front-end
//!
//! Thin shell over the library: parses arguments, opens the database, calls
//! one operation and prints the result as a table or as JSON.

use clap::{Parser, Subcommand};
use medicine_common::{NewMedicine, NewPriceOffer, NewSupplier, PaymentStatus};
use medicine_prices::{
    seed_sample_data, CatalogService, Database, PriceEngine, PurchaseRecorder, Result,
};
use serde::Serialize;
use std::path::PathBuf;

/// Compare medicine prices across stockists and track purchase savings
#[derive(Parser, Debug)]
#[command(name = "medicine_prices")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Print results as JSON instead of tables
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database and its tables
    Init,
    /// Fill an empty database with sample stockists, medicines and purchases
    Seed,
    /// Counts, savings, today's best deals and recently added medicines
    Dashboard,
    /// Cheapest offer for every medicine matching TEXT
    Search { text: String },
    /// All stockist offers for one medicine, ranked by price
    Offers { medicine_id: i64 },
    /// Every medicine with its lowest price and number of stockists
    Catalog,
    /// List stockists
    Stockists,
    /// Everything one stockist has offered, newest first
    StockistOffers { stockist_id: i64 },
    /// Add a stockist
    AddStockist {
        name: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        gst_no: String,
    },
    /// Add a medicine together with its first price offer
    AddMedicine {
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: String,
        #[arg(long, default_value = "")]
        generic: String,
        #[arg(long, default_value = "")]
        category: String,
        #[command(flatten)]
        price: PriceArgs,
    },
    /// Add another price offer for an existing medicine
    AddPrice {
        medicine_id: i64,
        #[command(flatten)]
        price: PriceArgs,
    },
    /// Record a purchase and show how much it saved
    RecordPurchase {
        #[arg(long)]
        medicine: String,
        #[arg(long)]
        stockist: String,
        /// Price actually paid
        #[arg(long)]
        paid: f64,
        /// Lowest price known when deciding
        #[arg(long)]
        lowest: f64,
    },
    /// Recently recorded purchases
    Purchases {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(clap::Args, Debug)]
struct PriceArgs {
    #[arg(long)]
    stockist_id: i64,
    #[arg(long)]
    net_rate: f64,
    #[arg(long)]
    mrp: f64,
    #[arg(long, default_value_t = 0.0)]
    discount: f64,
    /// Paid, Unpaid or "Half Paid"
    #[arg(long, default_value = "Unpaid")]
    paid_status: PaymentStatus,
    #[arg(long, default_value_t = 0.0)]
    paid_amount: f64,
}

impl PriceArgs {
    fn to_offer(&self) -> Result<NewPriceOffer> {
        let offer = NewPriceOffer::new(self.stockist_id, self.net_rate, self.mrp, self.discount)?
            .with_payment(self.paid_status, self.paid_amount)?;
        Ok(offer)
    }
}

/// Returns the default database path: ~/.local/share/medicine_prices/medicine_prices.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("medicine_prices")
        .join("medicine_prices.db")
        .to_string_lossy()
        .to_string()
}

fn main() {
    // Set RUST_LOG to control log level, e.g. RUST_LOG=medicine_prices=debug
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        if e.is_validation() {
            eprintln!("{e}");
            std::process::exit(2);
        }
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let db_path = PathBuf::from(&args.database);
    log::debug!("Database path: {}", db_path.display());
    let db = Database::open(&db_path)?;
    let json = args.json;

    match args.command {
        Command::Init => {
            println!("Database ready at {}", db_path.display());
        }
        Command::Seed => {
            let summary = seed_sample_data(&db)?;
            emit(json, &summary, |s| {
                println!(
                    "Seeded {} stockists, {} medicines, {} offers, {} purchases",
                    s.stockists, s.medicines, s.offers, s.purchases
                )
            })?;
        }
        Command::Dashboard => {
            let stats = PriceEngine::new(&db).get_dashboard_stats()?;
            emit(json, &stats, |s| {
                println!("Medicines:       {}", s.total_medicines);
                println!("Stockists:       {}", s.total_stockists);
                println!("Purchases:       {}", s.total_purchases);
                println!("Total savings:   {:.2}", s.total_savings);
                println!("Average savings: {:.2}", s.avg_savings);
                println!();
                println!("Today's best deals:");
                if s.best_deals.is_empty() {
                    println!("  (no offers today)");
                }
                for deal in &s.best_deals {
                    println!(
                        "  {:<28} {:<24} {:>10.2} (MRP {:.2}, {}% off)",
                        deal.medicine_name,
                        deal.stockist_name,
                        deal.price,
                        deal.mrp,
                        deal.discount_percent
                    );
                }
                println!();
                println!("Recently added:");
                for medicine in &s.recent_medicines {
                    println!(
                        "  {:<28} {:<24} {}",
                        medicine.medicine_name, medicine.company_name, medicine.created_at
                    );
                }
            })?;
        }
        Command::Search { text } => {
            let results = PriceEngine::new(&db).search_lowest_price(&text)?;
            emit(json, &results, |rows| {
                if rows.is_empty() {
                    println!("No medicines found for {:?}", text);
                }
                for r in rows {
                    println!(
                        "{:>5}  {:<28} {:<20} {:<24} {:>10.2}  save {:.2}",
                        r.medicine_id,
                        r.medicine_name,
                        r.company_name,
                        r.stockist_name,
                        r.final_price,
                        r.savings
                    );
                }
            })?;
        }
        Command::Offers { medicine_id } => {
            let offers = PriceEngine::new(&db).get_all_stockist_prices(medicine_id)?;
            emit(json, &offers, |rows| {
                for o in rows {
                    println!(
                        "#{:<3} {:<24} {:>10.2}  MRP {:>8.2}  {:>5}% off  {:<9} {}",
                        o.price_rank,
                        o.stockist_name,
                        o.final_price,
                        o.mrp,
                        o.discount_percent,
                        o.paid_status,
                        o.purchase_date
                    );
                }
            })?;
        }
        Command::Catalog => {
            let rows = PriceEngine::new(&db).get_all_medicines_with_prices()?;
            emit(json, &rows, |rows| {
                for r in rows {
                    let lowest = r
                        .lowest_price
                        .map(|p| format!("{p:.2}"))
                        .unwrap_or_else(|| "-".to_string());
                    println!(
                        "{:>5}  {:<28} {:<20} {:>10}  {} stockist(s)",
                        r.id, r.medicine_name, r.company_name, lowest, r.stockist_count
                    );
                }
            })?;
        }
        Command::Stockists => {
            let suppliers = CatalogService::new(&db).list_suppliers()?;
            emit(json, &suppliers, |rows| {
                for s in rows {
                    println!("{:>5}  {:<24} {:<12} {}", s.id, s.name, s.contact, s.address);
                }
            })?;
        }
        Command::StockistOffers { stockist_id } => {
            let offers = CatalogService::new(&db).supplier_offers(stockist_id)?;
            emit(json, &offers, |rows| {
                for o in rows {
                    println!(
                        "{}  {:<28} {:<20} {:>10.2}",
                        o.purchase_date, o.medicine_name, o.company_name, o.final_price
                    );
                }
            })?;
        }
        Command::AddStockist {
            name,
            contact,
            address,
            gst_no,
        } => {
            let supplier = NewSupplier::new(&name)?.with_details(&contact, &address, &gst_no);
            let id = CatalogService::new(&db).add_supplier(&supplier)?;
            println!("Added stockist {id}");
        }
        Command::AddMedicine {
            name,
            company,
            generic,
            category,
            price,
        } => {
            let medicine = NewMedicine::new(&name, &company)?
                .with_generic_name(&generic)
                .with_category(&category);
            let offer = price.to_offer()?;
            let id = CatalogService::new(&db).add_medicine_with_price(&medicine, &offer)?;
            println!(
                "Added medicine {id} at {:.2} from stockist {}",
                offer.final_price(),
                offer.stockist_id
            );
        }
        Command::AddPrice { medicine_id, price } => {
            let offer = price.to_offer()?;
            CatalogService::new(&db).add_medicine_price(medicine_id, &offer)?;
            println!(
                "Added price {:.2} for medicine {medicine_id}",
                offer.final_price()
            );
        }
        Command::RecordPurchase {
            medicine,
            stockist,
            paid,
            lowest,
        } => {
            let savings =
                PurchaseRecorder::new(&db).record_purchase(&medicine, &stockist, paid, lowest)?;
            if savings >= 0.0 {
                println!("Saved {savings:.2}");
            } else {
                println!("Overpaid {:.2} compared to the best offer", -savings);
            }
        }
        Command::Purchases { limit } => {
            let purchases = PurchaseRecorder::new(&db).recent_purchases(limit)?;
            emit(json, &purchases, |rows| {
                for p in rows {
                    println!(
                        "{}  {:<28} {:<24} paid {:>8.2}  best {:>8.2}  savings {:>8.2}",
                        p.purchase_date,
                        p.medicine_name,
                        p.selected_stockist,
                        p.selected_price,
                        p.lowest_price,
                        p.savings
                    );
                }
            })?;
        }
    }

    Ok(())
}

/// Print `value` as pretty JSON, or hand it to `table` for human output
fn emit<T: Serialize>(json: bool, value: &T, table: impl FnOnce(&T)) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        table(value);
    }
    Ok(())
}
