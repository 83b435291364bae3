pub mod coupons;
pub mod customers;
pub mod organizations;
pub mod sessions;
pub mod shifts;
pub mod stores;
pub mod users;
pub mod visits;

pub use organizations::{Organization, OrganizationMembership};
pub use users::{find_by_email, NewUser, User};
