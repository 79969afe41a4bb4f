use axum::{
    routing::{get, post},
    Router,
};

pub mod products;
pub mod system;

/// Router for the product endpoints.
pub fn router() -> Router {
    Router::new()
        .route(
            "/products",
            post(products::create_product).get(products::list_products),
        )
        .route("/addProducts", post(products::create_products))
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/product/:name", get(products::get_product_by_name))
}
