use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    domain::{
        assets::CleanupReport,
        order_status::OrderStatus,
        roles::Role,
        shipping::{QuoteSource, RegionType, ShippingQuote},
    },
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        orders::{
            CheckoutRequest, CheckoutResponse, OrderList, OrderWithItems, StatusUpdateResponse,
            UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        shipping::{
            ShippingConfigList, ShippingConfigRequest, ShippingQuoteRequest,
            UpdateShippingSettingsRequest,
        },
        storage::UploadResponse,
        users::{RoleUser, UpdateRoleRequest, UpdateRoleResponse, UserList},
    },
    models::{
        CartItem, Category, Order, OrderItem, Product, Profile, ShippingConfig, ShippingSettings,
    },
    response::Meta,
    routes::{
        admin, auth, cart, categories, health, orders, params, products as product_routes,
        shipping, storage,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::me,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        categories::list_categories,
        product_routes::list_products,
        product_routes::create_product,
        product_routes::get_product,
        product_routes::update_product,
        product_routes::delete_product,
        orders::list_order,
        orders::checkout,
        orders::get_order,
        shipping::quote,
        storage::upload,
        storage::download,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::list_users,
        admin::update_role,
        admin::list_shipping_configs,
        admin::create_shipping_config,
        admin::update_shipping_config,
        admin::delete_shipping_config,
        admin::get_shipping_settings,
        admin::update_shipping_settings,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::cleanup_storage
    ),
    components(
        schemas(
            Profile,
            Role,
            Category,
            Product,
            CartItem,
            Order,
            OrderStatus,
            OrderItem,
            ShippingConfig,
            ShippingSettings,
            RegionType,
            QuoteSource,
            ShippingQuote,
            CleanupReport,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            CartItemDto,
            CartList,
            CategoryList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CheckoutRequest,
            CheckoutResponse,
            OrderList,
            OrderWithItems,
            StatusUpdateResponse,
            UpdateOrderStatusRequest,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ShippingConfigList,
            ShippingConfigRequest,
            ShippingQuoteRequest,
            UpdateShippingSettingsRequest,
            UploadResponse,
            RoleUser,
            UpdateRoleRequest,
            UpdateRoleResponse,
            UserList,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            params::UserListQuery,
            Meta
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Shipping", description = "Shipping quotes"),
        (name = "Storage", description = "Temporary uploads and signed downloads"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_admin_paths() {
        let spec = ApiDoc::openapi();
        for path in [
            "/api/admin/users/role",
            "/api/admin/orders/{id}/status",
            "/api/admin/storage/cleanup",
            "/api/shipping/quote",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
