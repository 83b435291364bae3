pub mod auth;
pub mod coupons;
pub mod customers;
pub mod dashboard;
pub mod layout;
pub mod organization;
pub mod shifts;
pub mod stores;
pub mod visits;
