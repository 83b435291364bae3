pub mod branding;
pub mod coupon_code;
pub mod email;
pub mod local_time;
pub mod ids;
pub mod organization_name;
pub mod organization_role;
pub mod password;
pub mod permission;
pub mod shift_window;
pub mod validation_helpers;

pub use branding::Branding;
pub use coupon_code::CouponCode;
pub use email::Email;
pub use ids::{CouponId, CustomerId, OrganizationId, ShiftId, StoreId, UserId, VisitId};
pub use organization_name::OrganizationName;
pub use organization_role::OrganizationRole;
pub use password::{HashedPassword, Password};
pub use permission::Permission;
pub use shift_window::ShiftWindow;
