//! Catalog service: stockists, medicines and the price offers attached to them
//!
//! Records are created once and never edited; price offers are append-only.

use crate::database::{self, Database, DbResult};
use crate::error::Result;
use medicine_common::{
    Medicine, NewMedicine, NewPriceOffer, NewSupplier, PaymentStatus, PriceOffer, Supplier,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::Serialize;

/// One offer listed by a stockist, with the medicine it is for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockistOffer {
    pub offer_id: i64,
    pub medicine_id: i64,
    pub medicine_name: String,
    pub company_name: String,
    pub net_rate: f64,
    pub mrp: f64,
    pub discount_percent: f64,
    pub final_price: f64,
    pub purchase_date: String,
}

/// Creates and lists catalog records
pub struct CatalogService<'a> {
    db: &'a Database,
}

impl<'a> CatalogService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Add a stockist, returning its id
    pub fn add_supplier(&self, supplier: &NewSupplier) -> Result<i64> {
        supplier.validate()?;
        let id = insert_supplier(self.db.conn(), supplier)?;
        log::info!("Added stockist {} ({})", id, supplier.name);
        Ok(id)
    }

    /// All stockists, alphabetically
    pub fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        let suppliers = self.db.fetch_all(
            "SELECT id, name, contact, address, gst_no, created_at
             FROM stockists
             ORDER BY name ASC, id ASC",
            [],
            supplier_from_row,
        )?;
        Ok(suppliers)
    }

    pub fn get_supplier(&self, id: i64) -> Result<Option<Supplier>> {
        let supplier = self.db.fetch_one(
            "SELECT id, name, contact, address, gst_no, created_at
             FROM stockists WHERE id = ?1",
            params![id],
            supplier_from_row,
        )?;
        Ok(supplier)
    }

    /// Add a medicine without any price, returning its id
    pub fn add_medicine(&self, medicine: &NewMedicine) -> Result<i64> {
        medicine.validate()?;
        let id = insert_medicine(self.db.conn(), medicine)?;
        log::info!("Added medicine {} ({})", id, medicine.medicine_name);
        Ok(id)
    }

    /// Append a price offer for an existing medicine, returning the offer id
    pub fn add_medicine_price(&self, medicine_id: i64, offer: &NewPriceOffer) -> Result<i64> {
        offer.validate()?;
        let id = insert_price(self.db.conn(), medicine_id, offer)?;
        log::info!(
            "Added price {:.2} for medicine {} from stockist {}",
            offer.final_price(),
            medicine_id,
            offer.stockist_id
        );
        Ok(id)
    }

    /// Add a medicine together with its first price offer.
    ///
    /// Both rows are written in one transaction: if the offer cannot be
    /// stored (e.g. unknown stockist) the medicine is not kept either.
    pub fn add_medicine_with_price(
        &self,
        medicine: &NewMedicine,
        offer: &NewPriceOffer,
    ) -> Result<i64> {
        medicine.validate()?;
        offer.validate()?;

        let tx = self.db.transaction()?;
        let medicine_id = insert_medicine(&tx, medicine)?;
        insert_price(&tx, medicine_id, offer)?;
        tx.commit()?;

        log::info!(
            "Added medicine {} ({}) with initial price {:.2}",
            medicine_id,
            medicine.medicine_name,
            offer.final_price()
        );
        Ok(medicine_id)
    }

    pub fn get_medicine(&self, id: i64) -> Result<Option<Medicine>> {
        let medicine = self.db.fetch_one(
            "SELECT id, medicine_name, company_name, generic_name, category, created_at
             FROM medicines WHERE id = ?1",
            params![id],
            medicine_from_row,
        )?;
        Ok(medicine)
    }

    pub fn get_offer(&self, id: i64) -> Result<Option<PriceOffer>> {
        let offer = self.db.fetch_one(
            "SELECT id, medicine_id, stockist_id, net_rate, mrp, discount_percent,
                    final_price, paid_status, paid_amount, purchase_date
             FROM medicine_prices WHERE id = ?1",
            params![id],
            offer_from_row,
        )?;
        Ok(offer)
    }

    /// Every offer one stockist has listed, newest first
    pub fn supplier_offers(&self, stockist_id: i64) -> Result<Vec<StockistOffer>> {
        let offers = self.db.fetch_all(
            "SELECT mp.id AS offer_id,
                    m.id AS medicine_id,
                    m.medicine_name,
                    m.company_name,
                    mp.net_rate,
                    mp.mrp,
                    mp.discount_percent,
                    mp.final_price,
                    mp.purchase_date
             FROM medicine_prices mp
             JOIN medicines m ON mp.medicine_id = m.id
             WHERE mp.stockist_id = ?1
             ORDER BY mp.purchase_date DESC, mp.id DESC",
            params![stockist_id],
            |row| {
                Ok(StockistOffer {
                    offer_id: row.get("offer_id")?,
                    medicine_id: row.get("medicine_id")?,
                    medicine_name: row.get("medicine_name")?,
                    company_name: row.get("company_name")?,
                    net_rate: row.get("net_rate")?,
                    mrp: row.get("mrp")?,
                    discount_percent: row.get("discount_percent")?,
                    final_price: row.get("final_price")?,
                    purchase_date: row.get("purchase_date")?,
                })
            },
        )?;
        log::debug!("Stockist {} has {} offers", stockist_id, offers.len());
        Ok(offers)
    }
}

pub(crate) fn insert_supplier(conn: &Connection, supplier: &NewSupplier) -> DbResult<i64> {
    database::insert(
        conn,
        "INSERT INTO stockists (name, contact, address, gst_no) VALUES (?1, ?2, ?3, ?4)",
        params![
            &supplier.name,
            &supplier.contact,
            &supplier.address,
            &supplier.gst_no
        ],
    )
}

pub(crate) fn insert_medicine(conn: &Connection, medicine: &NewMedicine) -> DbResult<i64> {
    database::insert(
        conn,
        "INSERT INTO medicines (medicine_name, company_name, generic_name, category)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            &medicine.medicine_name,
            &medicine.company_name,
            &medicine.generic_name,
            &medicine.category
        ],
    )
}

/// Insert one offer. The final price is always derived from MRP and discount.
pub(crate) fn insert_price(
    conn: &Connection,
    medicine_id: i64,
    offer: &NewPriceOffer,
) -> DbResult<i64> {
    database::insert(
        conn,
        "INSERT INTO medicine_prices
         (medicine_id, stockist_id, net_rate, mrp, discount_percent,
          final_price, paid_status, paid_amount, purchase_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, COALESCE(?9, CURRENT_TIMESTAMP))",
        params![
            medicine_id,
            offer.stockist_id,
            offer.net_rate,
            offer.mrp,
            offer.discount_percent,
            offer.final_price(),
            offer.paid_status.as_str(),
            offer.paid_amount,
            offer.purchase_date,
        ],
    )
}

/// Read a `paid_status` text column into a [`PaymentStatus`]
pub(crate) fn read_payment_status(row: &Row<'_>, column: &str) -> DbResult<PaymentStatus> {
    let text: String = row.get(column)?;
    text.parse().map_err(|e| {
        let index = row.as_ref().column_index(column).unwrap_or(0);
        rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e))
    })
}

fn supplier_from_row(row: &Row<'_>) -> DbResult<Supplier> {
    Ok(Supplier {
        id: row.get("id")?,
        name: row.get("name")?,
        contact: row.get("contact")?,
        address: row.get("address")?,
        gst_no: row.get("gst_no")?,
        created_at: row.get("created_at")?,
    })
}

fn medicine_from_row(row: &Row<'_>) -> DbResult<Medicine> {
    Ok(Medicine {
        id: row.get("id")?,
        medicine_name: row.get("medicine_name")?,
        company_name: row.get("company_name")?,
        generic_name: row.get("generic_name")?,
        category: row.get("category")?,
        created_at: row.get("created_at")?,
    })
}

fn offer_from_row(row: &Row<'_>) -> DbResult<PriceOffer> {
    Ok(PriceOffer {
        id: row.get("id")?,
        medicine_id: row.get("medicine_id")?,
        stockist_id: row.get("stockist_id")?,
        net_rate: row.get("net_rate")?,
        mrp: row.get("mrp")?,
        discount_percent: row.get("discount_percent")?,
        final_price: row.get("final_price")?,
        paid_status: read_payment_status(row, "paid_status")?,
        paid_amount: row.get("paid_amount")?,
        purchase_date: row.get("purchase_date")?,
    })
}
