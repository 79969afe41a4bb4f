//! Product catalog entity: record shape and field validation.

pub mod product;

pub use product::{
    DESCRIPTION_MAX_LEN, DESCRIPTION_MIN_LEN, NAME_MAX_LEN, NAME_MIN_LEN, NewProduct, PRICE_SCALE,
    Product, ProductDraft, min_price,
};
