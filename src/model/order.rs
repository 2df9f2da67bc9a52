//! Order data handed over by the cart collaborator.

use serde::{Deserialize, Serialize};

use super::lenient;

/// An ingredient change on a cart line (e.g. a salad add-on).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    pub ingredient_name: String,
    #[serde(default)]
    pub extra_cost: f64,
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_name: String,
    #[serde(default)]
    pub size_name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: f64,
    pub subtotal: f64,
    #[serde(default)]
    pub custom_label: Option<String>,
    #[serde(default)]
    pub kitchen_note: Option<String>,
    #[serde(default)]
    pub customizations: Vec<Customization>,
}

impl CartLine {
    /// A plain line without size or customizations.
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_price: f64) -> Self {
        Self {
            product_name: product_name.into(),
            size_name: None,
            quantity,
            unit_price,
            subtotal: unit_price * quantity as f64,
            custom_label: None,
            kitchen_note: None,
            customizations: Vec::new(),
        }
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size_name = Some(size.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.custom_label = Some(label.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.kitchen_note = Some(note.into());
        self
    }

    pub fn with_customization(mut self, ingredient: impl Into<String>, extra_cost: f64) -> Self {
        self.customizations.push(Customization {
            ingredient_name: ingredient.into(),
            extra_cost,
        });
        self.subtotal += extra_cost * self.quantity as f64;
        self
    }

    /// Custom label, if present and not blank.
    pub fn label(&self) -> Option<&str> {
        non_blank(self.custom_label.as_deref())
    }

    /// Kitchen note, if present and not blank.
    pub fn note(&self) -> Option<&str> {
        non_blank(self.kitchen_note.as_deref())
    }

    /// Size name, if present and not blank.
    pub fn size(&self) -> Option<&str> {
        non_blank(self.size_name.as_deref())
    }
}

/// Everything a client or kitchen ticket prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketContext {
    #[serde(default, deserialize_with = "lenient::optional_text_or_number")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub date_str: String,
    #[serde(default)]
    pub payment_method_label: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub lines: Vec<CartLine>,
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
