use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Cart, CartLine};

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartLine>,
}
