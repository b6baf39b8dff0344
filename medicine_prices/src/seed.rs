//! Sample data for demos and manual testing
//!
//! Prices are derived from the row position instead of a random generator so
//! every seeded database looks the same.

use crate::catalog::{insert_medicine, insert_price, insert_supplier};
use crate::database::{self, get_stockist_count, timestamp_days_ago, Database};
use crate::error::Result;
use medicine_common::{pricing, NewMedicine, NewPriceOffer, NewSupplier, PaymentStatus};
use rusqlite::params;
use serde::Serialize;

const STOCKISTS: &[(&str, &str, &str, &str)] = &[
    ("MediCorp Distributors", "9876543210", "Mumbai, Maharashtra", "27AABCU9603R1ZM"),
    ("PharmaCare Solutions", "9876543211", "Delhi, NCR", "07AAFCP4567R1ZL"),
    ("HealthFirst Agencies", "9876543212", "Bangalore, Karnataka", "29AAAFH1234R1ZB"),
    ("LifeLine Medical", "9876543213", "Chennai, Tamil Nadu", "33AABCL7890R1ZT"),
    ("Wellness Distributors", "9876543214", "Kolkata, West Bengal", "19AABCW4567R1ZK"),
    ("MediMart India", "9876543215", "Pune, Maharashtra", "27AABCM8901R1ZM"),
    ("City Healthcare", "9876543216", "Hyderabad, Telangana", "36AACCH2345R1ZT"),
    ("Prime Pharma", "9876543217", "Ahmedabad, Gujarat", "24AAPPP5678R1ZJ"),
    ("Reliable Medicos", "9876543218", "Jaipur, Rajasthan", "08AARRM9012R1ZR"),
    ("Surgicals & Medicals", "9876543219", "Lucknow, UP", "09AASSM3456R1ZU"),
];

// (medicine_name, company_name, generic_name, category)
const MEDICINES: &[(&str, &str, &str, &str)] = &[
    ("Paracetamol 500mg", "Cipla", "Paracetamol", "Analgesic"),
    ("Amoxicillin 250mg", "GSK", "Amoxicillin", "Antibiotic"),
    ("Omeprazole 20mg", "Sun Pharma", "Omeprazole", "Antacid"),
    ("Metformin 500mg", "Lupin", "Metformin", "Antidiabetic"),
    ("Amlodipine 5mg", "Dr Reddys", "Amlodipine", "Antihypertensive"),
    ("Azithromycin 500mg", "Pfizer", "Azithromycin", "Antibiotic"),
    ("Cetirizine 10mg", "Johnson & Johnson", "Cetirizine", "Antihistamine"),
    ("Dolo 650mg", "Micro Labs", "Paracetamol", "Analgesic"),
    ("Vitamin D3 60K", "Abbott", "Cholecalciferol", "Vitamin"),
    ("Calcium Tablet", "GlaxoSmithKline", "Calcium Carbonate", "Supplement"),
    ("B-Complex", "Merck", "Vitamin B Complex", "Vitamin"),
    ("Aspirin 75mg", "Bayer", "Aspirin", "Blood Thinner"),
    ("Atorvastatin 10mg", "Zydus Cadila", "Atorvastatin", "Cholesterol"),
    ("Levothyroxine 50mcg", "Abbott", "Levothyroxine", "Thyroid"),
    ("Pantoprazole 40mg", "Alkem", "Pantoprazole", "Antacid"),
    ("Losartan 50mg", "Torrent", "Losartan", "Antihypertensive"),
    ("Gabapentin 300mg", "Sun Pharma", "Gabapentin", "Neuropathic Pain"),
    ("Diclofenac Gel", "Volta", "Diclofenac", "Anti-inflammatory"),
    ("Cough Syrup", "Himalaya", "Herbal", "Respiratory"),
    ("Insulin Regular", "Novo Nordisk", "Insulin", "Antidiabetic"),
];

const DISCOUNTS: [f64; 7] = [0.0, 2.5, 5.0, 7.5, 10.0, 12.5, 15.0];

const SAMPLE_PURCHASES: usize = 50;

/// Rows written by [`seed_sample_data`]
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SeedSummary {
    pub stockists: usize,
    pub medicines: usize,
    pub offers: usize,
    pub purchases: usize,
}

/// Populate an empty database with demo stockists, medicines, offers and purchases.
///
/// Does nothing (and returns an empty summary) when stockists already exist.
/// Everything is written in a single transaction.
pub fn seed_sample_data(db: &Database) -> Result<SeedSummary> {
    let existing = get_stockist_count(db.conn())?;
    if existing > 0 {
        log::warn!(
            "Database already has {} stockists, not seeding sample data",
            existing
        );
        return Ok(SeedSummary::default());
    }

    let tx = db.transaction()?;
    let mut summary = SeedSummary::default();

    let mut stockist_ids = Vec::with_capacity(STOCKISTS.len());
    for (name, contact, address, gst_no) in STOCKISTS {
        let supplier = NewSupplier::new(name)?.with_details(contact, address, gst_no);
        stockist_ids.push(insert_supplier(&tx, &supplier)?);
        summary.stockists += 1;
    }

    // (medicine_name, [(stockist_name, final_price)])
    let mut listings: Vec<(&str, Vec<(&str, f64)>)> = Vec::with_capacity(MEDICINES.len());
    for (i, (name, company, generic, category)) in MEDICINES.iter().enumerate() {
        let medicine = NewMedicine::new(name, company)?
            .with_generic_name(generic)
            .with_category(category);
        let medicine_id = insert_medicine(&tx, &medicine)?;
        summary.medicines += 1;

        let mut prices = Vec::new();
        for j in 0..(3 + i % 4) {
            // Step 7 is coprime with 10, so stockists never repeat for one medicine
            let stockist = (i * 3 + j * 7) % stockist_ids.len();
            let base = 10.0 + ((i * 37 + j * 53) % 490) as f64;
            let mrp = pricing::round_to_cents(base * (1.15 + ((i + j) % 5) as f64 * 0.05));
            let discount = DISCOUNTS[(i + 2 * j) % DISCOUNTS.len()];
            let final_price = pricing::final_price(mrp, discount);
            let net_rate = pricing::round_to_cents(final_price * 0.9);
            let (status, paid) = match (i + j) % 3 {
                0 => (PaymentStatus::Paid, final_price),
                1 => (PaymentStatus::Unpaid, 0.0),
                _ => (PaymentStatus::HalfPaid, pricing::round_to_cents(final_price / 2.0)),
            };

            let offer = NewPriceOffer::new(stockist_ids[stockist], net_rate, mrp, discount)?
                .with_payment(status, paid)?
                .dated(&timestamp_days_ago(((i * 11 + j * 5) % 31) as i64))?;
            insert_price(&tx, medicine_id, &offer)?;
            prices.push((STOCKISTS[stockist].0, offer.final_price()));
            summary.offers += 1;
        }
        listings.push((*name, prices));
    }

    for n in 0..SAMPLE_PURCHASES {
        let (medicine_name, prices) = &listings[(n * 7) % listings.len()];
        let lowest = prices
            .iter()
            .map(|(_, price)| *price)
            .fold(f64::INFINITY, f64::min);
        let (stockist_name, paid) = prices[n % prices.len()];
        database::insert(
            &tx,
            "INSERT INTO purchases
             (medicine_name, selected_stockist, selected_price, lowest_price, savings, purchase_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                *medicine_name,
                stockist_name,
                paid,
                lowest,
                lowest - paid,
                timestamp_days_ago(1 + (n % 30) as i64)
            ],
        )?;
        summary.purchases += 1;
    }

    tx.commit()?;
    log::info!(
        "Seeded {} stockists, {} medicines, {} offers, {} purchases",
        summary.stockists,
        summary.medicines,
        summary.offers,
        summary.purchases
    );
    Ok(summary)
}
