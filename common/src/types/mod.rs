pub mod criteria;
pub mod errors;
pub mod position;
pub mod restaurant;
pub mod route;
