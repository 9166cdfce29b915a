pub mod cart_items;
pub mod categories;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod shipping_configs;
pub mod shipping_settings;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use categories::Entity as Categories;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use shipping_configs::Entity as ShippingConfigs;
pub use shipping_settings::Entity as ShippingSettings;
pub use users::Entity as Users;
