//! Pure decision logic shared by the services.

pub mod assets;
pub mod order_status;
pub mod roles;
pub mod shipping;
