use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crudapi_core::ProductId;
use crudapi_infra::{ProductStore, StoreError};
use crudapi_products::ProductDraft;

use crate::app::{dto, errors, SharedStore};

fn parse_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse::<ProductId>()
        .map_err(errors::domain_error_to_response)
}

pub async fn create_product(
    Extension(store): Extension<SharedStore>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };

    let new = match body.validate() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.save(new).await {
        Ok(saved) => {
            tracing::info!(product_id = %saved.id, "product created");
            (StatusCode::OK, Json(saved)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_products(
    Extension(store): Extension<SharedStore>,
    body: Result<Json<Vec<ProductDraft>>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };

    let batch = match dto::validate_batch(&body) {
        Ok(b) => b,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.save_all(batch).await {
        Ok(saved) => {
            tracing::info!(count = saved.len(), "products created");
            (StatusCode::OK, Json(saved)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_products(Extension(store): Extension<SharedStore>) -> axum::response::Response {
    match store.find_all().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match store.find_by_id(id).await {
        Ok(Some(p)) => (StatusCode::OK, Json(p)).into_response(),
        Ok(None) => errors::store_error_to_response(StoreError::NotFound(id)),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_product_by_name(
    Extension(store): Extension<SharedStore>,
    Path(name): Path<String>,
) -> axum::response::Response {
    match store.find_by_name(&name).await {
        Ok(Some(p)) => (StatusCode::OK, Json(p)).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("product '{name}' not found"),
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
    body: Result<Json<ProductDraft>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rej) => return errors::json_rejection_to_response(rej),
    };

    // The path id wins over any id in the body.
    let product = match body.validate() {
        Ok(p) => p.with_id(id),
        Err(e) => return errors::domain_error_to_response(e),
    };

    match store.update(product).await {
        Ok(updated) => {
            tracing::info!(product_id = %id, "product updated");
            (StatusCode::OK, Json(updated)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match store.delete_by_id(id).await {
        Ok(()) => {
            tracing::info!(product_id = %id, "product deleted");
            (StatusCode::OK, dto::removed_message(id)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
