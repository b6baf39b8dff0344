//! Purchase recorder
//!
//! A purchase is a historical fact: medicine and stockist are stored by name,
//! not by catalog id, and are not checked against the catalog.

use crate::database::Database;
use crate::error::Result;
use medicine_common::validation::require_amount;
use medicine_common::Purchase;
use rusqlite::params;

pub struct PurchaseRecorder<'a> {
    db: &'a Database,
}

impl<'a> PurchaseRecorder<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Store a purchase decision and return its savings.
    ///
    /// `savings = lowest_price - paid_price`: positive when the buyer paid no
    /// more than the best known offer, negative when they overpaid. Both
    /// prices must be finite and non-negative.
    pub fn record_purchase(
        &self,
        medicine_name: &str,
        stockist_name: &str,
        paid_price: f64,
        lowest_price: f64,
    ) -> Result<f64> {
        let paid_price = require_amount("paid price", paid_price)?;
        let lowest_price = require_amount("lowest price", lowest_price)?;
        let savings = lowest_price - paid_price;

        let id = self.db.insert(
            "INSERT INTO purchases
             (medicine_name, selected_stockist, selected_price, lowest_price, savings)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![medicine_name, stockist_name, paid_price, lowest_price, savings],
        )?;

        log::info!(
            "Recorded purchase {}: {} from {} at {:.2} (savings {:.2})",
            id,
            medicine_name,
            stockist_name,
            paid_price,
            savings
        );
        Ok(savings)
    }

    /// Most recent purchases first
    pub fn recent_purchases(&self, limit: usize) -> Result<Vec<Purchase>> {
        let purchases = self.db.fetch_all(
            "SELECT id, medicine_name, selected_stockist, selected_price,
                    lowest_price, savings, purchase_date
             FROM purchases
             ORDER BY purchase_date DESC, id DESC
             LIMIT ?1",
            params![limit as i64],
            |row| {
                Ok(Purchase {
                    id: row.get("id")?,
                    medicine_name: row.get("medicine_name")?,
                    selected_stockist: row.get("selected_stockist")?,
                    selected_price: row.get("selected_price")?,
                    lowest_price: row.get("lowest_price")?,
                    savings: row.get("savings")?,
                    purchase_date: row.get("purchase_date")?,
                })
            },
        )?;
        Ok(purchases)
    }
}
