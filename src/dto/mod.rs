pub mod auth;
pub mod cart;
pub mod favorites;
pub mod posts;
pub mod products;
pub mod recommendations;
pub mod routines;
