//! End-of-shift cash reconciliation data.

use serde::{Deserialize, Serialize};

use super::lenient;

/// One sale listed in the cash-cut detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleEntry {
    #[serde(deserialize_with = "lenient::text_or_number")]
    pub number: String,
    pub payment_method: String,
    pub amount: f64,
    pub time: String,
    #[serde(default)]
    pub customer: Option<String>,
}

/// How the register was opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningInfo {
    pub opened_at: String,
    #[serde(default)]
    pub opened_by: Option<String>,
    pub initial_cash: f64,
}

/// Units and revenue for one product over the shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductTotal {
    pub name: String,
    pub quantity: u32,
    pub total: f64,
}

/// A cash deposit into or withdrawal from the drawer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub concept: String,
    pub amount: f64,
    #[serde(default)]
    pub time: Option<String>,
}

/// A card payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTransaction {
    #[serde(default)]
    pub reference: Option<String>,
    pub amount: f64,
    #[serde(default)]
    pub time: Option<String>,
}

/// A counted bill or coin denomination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenominationEntry {
    pub label: String,
    pub value: f64,
    pub quantity: u32,
}

impl DenominationEntry {
    pub fn subtotal(&self) -> f64 {
        self.value * self.quantity as f64
    }
}

/// Everything the cash-cut report prints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashCutContext {
    pub title: String,
    pub generated_at: String,
    pub sales_count: u32,
    pub expected_cash: f64,
    pub counted_cash: f64,
    pub difference: f64,
    pub cash_total: f64,
    pub card_total: f64,
    pub sales: Vec<SaleEntry>,
    pub denomination_entries: Vec<DenominationEntry>,
    pub opening: Option<OpeningInfo>,
    pub product_totals: Vec<ProductTotal>,
    pub deposits: Vec<CashMovement>,
    pub withdrawals: Vec<CashMovement>,
    pub card_transactions: Vec<CardTransaction>,
}
