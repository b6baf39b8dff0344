//! Price engine: lowest-price lookups, stockist rankings and dashboard figures
//!
//! Read-only. All numbers it sees were validated on the way in, so nothing
//! here re-checks prices or discounts.

use crate::catalog::read_payment_status;
use crate::database::{like_substring_pattern, today_date, Database, DbResult};
use crate::error::Result;
use crate::ranking::rank_by_price;
use medicine_common::pricing::{mrp_savings, round_to_cents};
use medicine_common::PaymentStatus;
use rusqlite::{params, Row};
use serde::Serialize;

/// Search text shorter than this (after trimming) returns nothing
pub const MIN_SEARCH_LEN: usize = 2;

/// Length of the dashboard's best-deal and recently-added lists
pub const DASHBOARD_LIST_LIMIT: usize = 5;

/// Cheapest offer for one medicine matching a search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub medicine_id: i64,
    pub medicine_name: String,
    pub company_name: String,
    pub generic_name: String,
    pub stockist_id: i64,
    pub stockist_name: String,
    pub offer_id: i64,
    pub final_price: f64,
    pub mrp: f64,
    pub discount_percent: f64,
    /// MRP minus final price
    pub savings: f64,
}

/// One stockist's offer for a medicine, ranked against the others
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedOffer {
    /// 1 = cheapest; equal prices share a rank
    pub price_rank: u32,
    pub offer_id: i64,
    pub stockist_id: i64,
    pub stockist_name: String,
    pub contact: String,
    pub address: String,
    pub net_rate: f64,
    pub mrp: f64,
    pub discount_percent: f64,
    pub final_price: f64,
    pub paid_status: PaymentStatus,
    pub paid_amount: f64,
    pub purchase_date: String,
}

/// A medicine with its best known prices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRow {
    pub id: i64,
    pub medicine_name: String,
    pub company_name: String,
    pub generic_name: String,
    pub category: String,
    /// `None` when nobody has offered the medicine yet
    pub lowest_price: Option<f64>,
    pub mrp: Option<f64>,
    pub stockist_count: i64,
}

/// Cheapest offer listed today for one medicine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestDeal {
    pub medicine_id: i64,
    pub medicine_name: String,
    pub company_name: String,
    pub stockist_name: String,
    pub price: f64,
    pub mrp: f64,
    pub savings: f64,
    pub discount_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentMedicine {
    pub id: i64,
    pub medicine_name: String,
    pub company_name: String,
    pub created_at: String,
}

/// Figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Distinct medicine names (formulations sharing a name count once)
    pub total_medicines: i64,
    pub total_stockists: i64,
    pub total_purchases: i64,
    pub total_savings: f64,
    pub avg_savings: f64,
    pub best_deals: Vec<BestDeal>,
    pub recent_medicines: Vec<RecentMedicine>,
}

/// Answers "what is the cheapest way to buy X" and "what does the catalog look like"
pub struct PriceEngine<'a> {
    db: &'a Database,
}

impl<'a> PriceEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Cheapest offer per medicine whose name, generic name or manufacturer
    /// contains `text`. Case is ignored for ASCII letters only, as with
    /// SQLite's `LIKE`, so "É" does not match "é".
    ///
    /// Text shorter than [`MIN_SEARCH_LEN`] after trimming returns an empty
    /// list without touching the database. Equal prices go to the older offer.
    pub fn search_lowest_price(&self, text: &str) -> Result<Vec<SearchResult>> {
        let term = text.trim();
        if term.chars().count() < MIN_SEARCH_LEN {
            log::debug!("Search text {:?} too short, skipping query", term);
            return Ok(Vec::new());
        }

        let pattern = like_substring_pattern(term);
        let results = self.db.fetch_all(
            r"WITH ranked AS (
                SELECT m.id AS medicine_id,
                       m.medicine_name,
                       m.company_name,
                       m.generic_name,
                       s.id AS stockist_id,
                       s.name AS stockist_name,
                       mp.id AS offer_id,
                       mp.final_price,
                       mp.mrp,
                       mp.discount_percent,
                       ROW_NUMBER() OVER (
                           PARTITION BY m.id ORDER BY mp.final_price ASC, mp.id ASC
                       ) AS price_rank
                FROM medicines m
                JOIN medicine_prices mp ON m.id = mp.medicine_id
                JOIN stockists s ON mp.stockist_id = s.id
                WHERE m.medicine_name LIKE ?1 ESCAPE '\'
                   OR m.generic_name LIKE ?1 ESCAPE '\'
                   OR m.company_name LIKE ?1 ESCAPE '\'
            )
            SELECT *
            FROM ranked
            WHERE price_rank = 1
            ORDER BY medicine_name ASC, medicine_id ASC",
            params![pattern],
            search_result_from_row,
        )?;

        log::debug!("Search {:?} matched {} medicines", term, results.len());
        Ok(results)
    }

    /// Every offer for a medicine, cheapest first, with `RANK()` semantics
    pub fn get_all_stockist_prices(&self, medicine_id: i64) -> Result<Vec<RankedOffer>> {
        let offers = self.db.fetch_all(
            "SELECT mp.id AS offer_id,
                    s.id AS stockist_id,
                    s.name AS stockist_name,
                    s.contact,
                    s.address,
                    mp.net_rate,
                    mp.mrp,
                    mp.discount_percent,
                    mp.final_price,
                    mp.paid_status,
                    mp.paid_amount,
                    mp.purchase_date
             FROM medicine_prices mp
             JOIN stockists s ON mp.stockist_id = s.id
             WHERE mp.medicine_id = ?1
             ORDER BY mp.final_price ASC, mp.id ASC",
            params![medicine_id],
            ranked_offer_from_row,
        )?;

        let ranked = rank_by_price(offers, |offer| offer.final_price)
            .into_iter()
            .map(|(rank, mut offer)| {
                offer.price_rank = rank;
                offer
            })
            .collect();
        Ok(ranked)
    }

    /// Every medicine with its lowest price, lowest MRP and number of distinct
    /// stockists, ordered by name. Medicines without offers are included.
    pub fn get_all_medicines_with_prices(&self) -> Result<Vec<CatalogRow>> {
        let rows = self.db.fetch_all(
            "SELECT m.id,
                    m.medicine_name,
                    m.company_name,
                    m.generic_name,
                    m.category,
                    MIN(mp.final_price) AS lowest_price,
                    MIN(mp.mrp) AS mrp,
                    COUNT(DISTINCT mp.stockist_id) AS stockist_count
             FROM medicines m
             LEFT JOIN medicine_prices mp ON m.id = mp.medicine_id
             GROUP BY m.id
             ORDER BY m.medicine_name ASC, m.id ASC",
            [],
            |row| {
                Ok(CatalogRow {
                    id: row.get("id")?,
                    medicine_name: row.get("medicine_name")?,
                    company_name: row.get("company_name")?,
                    generic_name: row.get("generic_name")?,
                    category: row.get("category")?,
                    lowest_price: row.get("lowest_price")?,
                    mrp: row.get("mrp")?,
                    stockist_count: row.get("stockist_count")?,
                })
            },
        )?;
        Ok(rows)
    }

    /// Dashboard figures, using today's UTC date for the best deals
    pub fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        self.dashboard_stats_for_date(&today_date())
    }

    /// Dashboard figures with best deals taken from offers dated `today` (`YYYY-MM-DD`)
    pub fn dashboard_stats_for_date(&self, today: &str) -> Result<DashboardStats> {
        let total_medicines: i64 = self.db.conn().query_row(
            "SELECT COUNT(DISTINCT medicine_name) FROM medicines",
            [],
            |row| row.get(0),
        )?;
        let total_stockists: i64 =
            self.db
                .conn()
                .query_row("SELECT COUNT(*) FROM stockists", [], |row| row.get(0))?;

        // COALESCE keeps an empty purchases table at zero instead of NULL
        let (total_purchases, total_savings, avg_savings): (i64, f64, f64) =
            self.db.conn().query_row(
                "SELECT COUNT(*) AS total_purchases,
                        COALESCE(SUM(savings), 0.0) AS total_savings,
                        COALESCE(AVG(savings), 0.0) AS avg_savings
                 FROM purchases",
                [],
                |row| {
                    Ok((
                        row.get("total_purchases")?,
                        row.get("total_savings")?,
                        row.get("avg_savings")?,
                    ))
                },
            )?;

        let best_deals = self.best_deals_on(today)?;
        let recent_medicines = self.recent_medicines()?;

        Ok(DashboardStats {
            total_medicines,
            total_stockists,
            total_purchases,
            total_savings: round_to_cents(total_savings),
            avg_savings: round_to_cents(avg_savings),
            best_deals,
            recent_medicines,
        })
    }

    /// For each medicine offered on `day`, its cheapest offer that day; top 5 by price
    fn best_deals_on(&self, day: &str) -> DbResult<Vec<BestDeal>> {
        self.db.fetch_all(
            "WITH todays AS (
                SELECT m.id AS medicine_id,
                       m.medicine_name,
                       m.company_name,
                       s.name AS stockist_name,
                       mp.final_price,
                       mp.mrp,
                       mp.discount_percent,
                       ROW_NUMBER() OVER (
                           PARTITION BY m.id ORDER BY mp.final_price ASC, mp.id ASC
                       ) AS price_rank
                FROM medicine_prices mp
                JOIN medicines m ON mp.medicine_id = m.id
                JOIN stockists s ON mp.stockist_id = s.id
                WHERE date(mp.purchase_date) = ?1
            )
            SELECT *
            FROM todays
            WHERE price_rank = 1
            ORDER BY final_price ASC, medicine_name ASC, medicine_id ASC
            LIMIT ?2",
            params![day, DASHBOARD_LIST_LIMIT as i64],
            |row| {
                let price: f64 = row.get("final_price")?;
                let mrp: f64 = row.get("mrp")?;
                Ok(BestDeal {
                    medicine_id: row.get("medicine_id")?,
                    medicine_name: row.get("medicine_name")?,
                    company_name: row.get("company_name")?,
                    stockist_name: row.get("stockist_name")?,
                    price,
                    mrp,
                    savings: mrp_savings(mrp, price),
                    discount_percent: row.get("discount_percent")?,
                })
            },
        )
    }

    fn recent_medicines(&self) -> DbResult<Vec<RecentMedicine>> {
        self.db.fetch_all(
            "SELECT id, medicine_name, company_name, created_at
             FROM medicines
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
            params![DASHBOARD_LIST_LIMIT as i64],
            |row| {
                Ok(RecentMedicine {
                    id: row.get("id")?,
                    medicine_name: row.get("medicine_name")?,
                    company_name: row.get("company_name")?,
                    created_at: row.get("created_at")?,
                })
            },
        )
    }
}

fn search_result_from_row(row: &Row<'_>) -> DbResult<SearchResult> {
    let final_price: f64 = row.get("final_price")?;
    let mrp: f64 = row.get("mrp")?;
    Ok(SearchResult {
        medicine_id: row.get("medicine_id")?,
        medicine_name: row.get("medicine_name")?,
        company_name: row.get("company_name")?,
        generic_name: row.get("generic_name")?,
        stockist_id: row.get("stockist_id")?,
        stockist_name: row.get("stockist_name")?,
        offer_id: row.get("offer_id")?,
        final_price,
        mrp,
        discount_percent: row.get("discount_percent")?,
        savings: mrp_savings(mrp, final_price),
    })
}

/// Rank is filled in after the rows are sorted
fn ranked_offer_from_row(row: &Row<'_>) -> DbResult<RankedOffer> {
    Ok(RankedOffer {
        price_rank: 0,
        offer_id: row.get("offer_id")?,
        stockist_id: row.get("stockist_id")?,
        stockist_name: row.get("stockist_name")?,
        contact: row.get("contact")?,
        address: row.get("address")?,
        net_rate: row.get("net_rate")?,
        mrp: row.get("mrp")?,
        discount_percent: row.get("discount_percent")?,
        final_price: row.get("final_price")?,
        paid_status: read_payment_status(row, "paid_status")?,
        paid_amount: row.get("paid_amount")?,
        purchase_date: row.get("purchase_date")?,
    })
}
