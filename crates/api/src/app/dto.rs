use crudapi_core::{DomainError, DomainResult, ProductId, Violation};
use crudapi_products::{NewProduct, ProductDraft};

/// Validate every element of a batch, collecting violations from all of them.
///
/// Field names are prefixed with the element index, e.g. `[1].price`.
pub fn validate_batch(drafts: &[ProductDraft]) -> DomainResult<Vec<NewProduct>> {
    let mut accepted = Vec::with_capacity(drafts.len());
    let mut violations = Vec::new();

    for (idx, draft) in drafts.iter().enumerate() {
        match draft.validate() {
            Ok(p) => accepted.push(p),
            Err(e) => violations.extend(
                e.violations()
                    .iter()
                    .map(|v| Violation::new(format!("[{idx}].{}", v.field), v.message.clone())),
            ),
        }
    }

    if violations.is_empty() {
        Ok(accepted)
    } else {
        Err(DomainError::validation(violations))
    }
}

/// Body of a successful delete.
pub fn removed_message(id: ProductId) -> String {
    format!("product removed !! {id}")
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn batch_violations_are_indexed() {
        let drafts = vec![
            ProductDraft::new("Pen", "Blue ink pen", Decimal::new(150, 2)),
            ProductDraft::new("A", "Blue ink pen", Decimal::new(150, 2)),
            ProductDraft::new("Ink", "Black ink", Decimal::ZERO),
        ];
        let err = validate_batch(&drafts).unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["[1].name", "[2].price"]);
    }

    #[test]
    fn valid_batch_keeps_order() {
        let drafts = vec![
            ProductDraft::new("Pen", "Blue ink pen", Decimal::new(150, 2)),
            ProductDraft::new("Ink", "Black ink", Decimal::new(300, 2)),
        ];
        let accepted = validate_batch(&drafts).unwrap();
        assert_eq!(accepted[0].name, "Pen");
        assert_eq!(accepted[1].name, "Ink");
    }

    #[test]
    fn removed_message_names_the_id() {
        assert_eq!(removed_message(ProductId::new(7)), "product removed !! 7");
    }
}
