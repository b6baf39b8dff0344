//! Catalog records and the forms used to create them

use crate::pricing;
use crate::validation::{self, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How much of an offer's invoice has been settled with the stockist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
    #[serde(rename = "Half Paid")]
    HalfPaid,
}

impl PaymentStatus {
    /// Text stored in the `paid_status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::HalfPaid => "Half Paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    /// Accepts "Paid", "Unpaid", "Half Paid", "Half-Paid" and "HalfPaid", ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "halfpaid" => Ok(PaymentStatus::HalfPaid),
            _ => Err(ValidationError::UnknownPaymentStatus(s.to_string())),
        }
    }
}

/// A stockist selling medicines
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    pub contact: String,
    pub address: String,
    pub gst_no: String,
    pub created_at: String,
}

/// A medicine formulation. Several medicines may share a name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Medicine {
    pub id: i64,
    pub medicine_name: String,
    pub company_name: String,
    pub generic_name: String,
    pub category: String,
    pub created_at: String,
}

/// One quoted price for a medicine from a stockist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceOffer {
    pub id: i64,
    pub medicine_id: i64,
    pub stockist_id: i64,
    pub net_rate: f64,
    pub mrp: f64,
    pub discount_percent: f64,
    pub final_price: f64,
    pub paid_status: PaymentStatus,
    pub paid_amount: f64,
    pub purchase_date: String,
}

/// Historical purchase decision. Names are snapshots, not catalog references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Purchase {
    pub id: i64,
    pub medicine_name: String,
    pub selected_stockist: String,
    pub selected_price: f64,
    pub lowest_price: f64,
    pub savings: f64,
    pub purchase_date: String,
}

/// Validated input for a new stockist
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub gst_no: String,
}

impl NewSupplier {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: validation::require_text("stockist name", name)?,
            contact: String::new(),
            address: String::new(),
            gst_no: String::new(),
        })
    }

    pub fn with_details(mut self, contact: &str, address: &str, gst_no: &str) -> Self {
        self.contact = contact.trim().to_string();
        self.address = address.trim().to_string();
        self.gst_no = gst_no.trim().to_string();
        self
    }

    /// Re-check a value built by hand or deserialized
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require_text("stockist name", &self.name)?;
        Ok(())
    }
}

/// Validated input for a new medicine
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewMedicine {
    pub medicine_name: String,
    pub company_name: String,
    #[serde(default)]
    pub generic_name: String,
    #[serde(default)]
    pub category: String,
}

impl NewMedicine {
    /// Generic name and category start out empty
    pub fn new(medicine_name: &str, company_name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            medicine_name: validation::require_text("medicine name", medicine_name)?,
            company_name: validation::require_text("manufacturer name", company_name)?,
            generic_name: String::new(),
            category: String::new(),
        })
    }

    pub fn with_generic_name(mut self, generic_name: &str) -> Self {
        self.generic_name = generic_name.trim().to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = category.trim().to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require_text("medicine name", &self.medicine_name)?;
        validation::require_text("manufacturer name", &self.company_name)?;
        Ok(())
    }
}

/// Validated input for a new price offer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPriceOffer {
    pub stockist_id: i64,
    pub net_rate: f64,
    pub mrp: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub paid_status: PaymentStatus,
    #[serde(default)]
    pub paid_amount: f64,
    /// `YYYY-MM-DD HH:MM:SS` (UTC). `None` means "now".
    #[serde(default)]
    pub purchase_date: Option<String>,
}

impl NewPriceOffer {
    pub fn new(
        stockist_id: i64,
        net_rate: f64,
        mrp: f64,
        discount_percent: f64,
    ) -> Result<Self, ValidationError> {
        let offer = Self {
            stockist_id,
            net_rate,
            mrp,
            discount_percent,
            paid_status: PaymentStatus::Unpaid,
            paid_amount: 0.0,
            purchase_date: None,
        };
        offer.validate()?;
        Ok(offer)
    }

    pub fn with_payment(
        mut self,
        status: PaymentStatus,
        paid_amount: f64,
    ) -> Result<Self, ValidationError> {
        self.paid_status = status;
        self.paid_amount = validation::require_amount("paid amount", paid_amount)?;
        Ok(self)
    }

    /// Back-date the offer. `purchase_date` must be `YYYY-MM-DD HH:MM:SS` (UTC).
    pub fn dated(mut self, purchase_date: &str) -> Result<Self, ValidationError> {
        self.purchase_date = Some(validation::require_timestamp(purchase_date)?);
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::require_amount("net rate", self.net_rate)?;
        validation::require_amount("mrp", self.mrp)?;
        validation::require_discount(self.discount_percent)?;
        validation::require_amount("paid amount", self.paid_amount)?;
        if let Some(date) = &self.purchase_date {
            validation::require_timestamp(date)?;
        }
        Ok(())
    }

    /// Price after discount, rounded to cents
    pub fn final_price(&self) -> f64 {
        pricing::final_price(self.mrp, self.discount_percent)
    }
}
