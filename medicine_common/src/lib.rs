//! Shared types for medicine price comparison.
//!
//! Catalog records (stockists, medicines, price offers, purchases), the
//! pricing arithmetic every offer goes through, and the validation applied to
//! user input before it reaches the database.

pub mod models;
pub mod pricing;
pub mod validation;

pub use models::{
    Medicine, NewMedicine, NewPriceOffer, NewSupplier, PaymentStatus, PriceOffer, Purchase,
    Supplier,
};
pub use pricing::{final_price, round_to_cents};
pub use validation::ValidationError;
