use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest},
        cart::{AddCartItemRequest, CartView, UpdateCartItemRequest},
        favorites::{AddFavoriteRequest, FavoriteCheck, FavoriteProduct, FavoriteProductList},
        posts::{CreatePostRequest, PostList, UpdatePostRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        recommendations::{CreateRecommendationRequest, RecommendationList, RecommendationView},
        routines::{CreateRoutineRequest, RoutineList, UpdateRoutineRequest},
    },
    models::{Cart, CartLine, Favorite, Post, PostAuthor, Product, Recommendation, Role, Routine, User},
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, favorites, health, params, posts, products as product_routes,
        recommendations, routines,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("token"))),
        );
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
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_me,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        cart::get_cart,
        cart::add_item,
        cart::update_item,
        cart::remove_item,
        cart::remove_product,
        cart::clear_cart,
        favorites::list_favorites,
        favorites::add_favorite,
        favorites::remove_favorite,
        favorites::check_favorite,
        routines::list_routines,
        routines::get_routine,
        routines::create_routine,
        routines::update_routine,
        routines::delete_routine,
        recommendations::list_mine,
        recommendations::list_all,
        recommendations::create_recommendation,
        recommendations::mark_read,
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post
    ),
    components(
        schemas(
            Role,
            User,
            Product,
            Cart,
            CartLine,
            Favorite,
            Routine,
            Recommendation,
            Post,
            PostAuthor,
            RegisterRequest,
            LoginRequest,
            UpdateProfileRequest,
            AuthResponse,
            AddCartItemRequest,
            UpdateCartItemRequest,
            CartView,
            AddFavoriteRequest,
            FavoriteProduct,
            FavoriteProductList,
            FavoriteCheck,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateRoutineRequest,
            UpdateRoutineRequest,
            RoutineList,
            CreateRecommendationRequest,
            RecommendationView,
            RecommendationList,
            CreatePostRequest,
            UpdatePostRequest,
            PostList,
            params::Pagination,
            params::ProductQuery,
            params::PostQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<PostList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Products", description = "Product catalog"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Favorites", description = "Favorite products"),
        (name = "Routines", description = "Personal wellness routines"),
        (name = "Recommendations", description = "Admin product recommendations"),
        (name = "Posts", description = "Community posts"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
