pub mod auth_service;
pub mod cart_service;
pub mod favorite_service;
pub mod post_service;
pub mod product_service;
pub mod recommendation_service;
pub mod routine_service;
