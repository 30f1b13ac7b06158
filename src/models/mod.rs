pub mod admin;
pub mod employee;
pub mod order;
pub mod order_item;
pub mod product;

pub use employee::EmployeeProfile;
pub use product::ProductPublic;
