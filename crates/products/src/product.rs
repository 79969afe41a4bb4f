use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crudapi_core::{DomainError, DomainResult, ProductId, Violation};

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MIN_LEN: usize = 5;
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Digits allowed after the decimal point of a price (matches `NUMERIC(38, 2)`).
pub const PRICE_SCALE: u32 = 2;

/// Smallest accepted price (0.01).
pub fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

/// A persisted product.
///
/// Only the store constructs these with a fresh id; everything else gets one
/// back from the store or rebuilds it from a validated [`NewProduct`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl Product {
    pub fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            description: new.description,
            price: new.price,
        }
    }
}

/// Field values that passed validation but have no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
}

impl NewProduct {
    /// Attach an id, e.g. the path id of an update.
    pub fn with_id(self, id: ProductId) -> Product {
        Product::from_new(id, self)
    }
}

/// Unvalidated product input as it arrives over the wire.
///
/// Every field is optional so that a missing field surfaces as a violation
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductDraft {
    #[serde(default)]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            description: Some(description.into()),
            price: Some(price),
        }
    }

    /// Check every field constraint and collect all violations.
    ///
    /// Any `id` on the draft is ignored; ids come from the store or the request path.
    pub fn validate(&self) -> DomainResult<NewProduct> {
        let violations = self.violations();
        match (&self.name, &self.description, self.price) {
            (Some(name), Some(description), Some(price)) if violations.is_empty() => {
                Ok(NewProduct {
                    name: name.clone(),
                    description: description.clone(),
                    price,
                })
            }
            _ => Err(DomainError::validation(violations)),
        }
    }

    /// All violated constraints, in field order (name, description, price).
    pub fn violations(&self) -> Vec<Violation> {
        let mut out = Vec::new();
        check_text(
            &mut out,
            "name",
            self.name.as_deref(),
            NAME_MIN_LEN,
            NAME_MAX_LEN,
        );
        check_text(
            &mut out,
            "description",
            self.description.as_deref(),
            DESCRIPTION_MIN_LEN,
            DESCRIPTION_MAX_LEN,
        );
        check_price(&mut out, self.price);
        out
    }
}

// Not-blank and size are independent checks; a blank value can fail both.
fn check_text(out: &mut Vec<Violation>, field: &str, value: Option<&str>, min: usize, max: usize) {
    let Some(value) = value else {
        out.push(Violation::new(field, format!("{field} must not be blank")));
        return;
    };

    if value.trim().is_empty() {
        out.push(Violation::new(field, format!("{field} must not be blank")));
    }

    let len = value.chars().count();
    if len < min || len > max {
        out.push(Violation::new(
            field,
            format!("{field} must be between {min} and {max} characters"),
        ));
    }
}

// Minimum and scale are independent checks; 0.001 fails both.
fn check_price(out: &mut Vec<Violation>, price: Option<Decimal>) {
    let Some(price) = price else {
        out.push(Violation::new("price", "price must not be null"));
        return;
    };

    if price < min_price() {
        out.push(Violation::new(
            "price",
            format!("price must be greater than or equal to {}", min_price()),
        ));
    }

    // Trailing zeros don't count: 1.500 is a two-decimal price.
    if price.normalize().scale() > PRICE_SCALE {
        out.push(Violation::new(
            "price",
            format!("price must have at most {PRICE_SCALE} decimal places"),
        ));
    }
}
