//! Medicine Prices - stockist price comparison & savings tracking
//!
//! Keeps a SQLite catalog of medicines and the prices stockists quote for
//! them, finds the cheapest offer per medicine, ranks stockists and records
//! how much each purchase saved against the best known price.

pub mod catalog;
pub mod database;
pub mod error;
pub mod price_engine;
pub mod purchases;
pub mod ranking;
pub mod seed;

pub use catalog::{CatalogService, StockistOffer};
pub use database::Database;
pub use error::{Error, MedicineError, Result};
pub use price_engine::{
    BestDeal, CatalogRow, DashboardStats, PriceEngine, RankedOffer, RecentMedicine, SearchResult,
};
pub use purchases::PurchaseRecorder;
pub use seed::{seed_sample_data, SeedSummary};
