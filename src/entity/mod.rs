pub mod posts;
pub mod products;
pub mod routines;
pub mod users;

pub use posts::Entity as Posts;
pub use products::Entity as Products;
pub use routines::Entity as Routines;
pub use users::Entity as Users;
