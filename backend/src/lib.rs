pub mod auth;
pub mod catchers;
pub mod config;
pub mod cors;
pub mod error;
pub mod processor;
pub mod queries;
pub mod rate_limiter;
pub mod routes;
pub mod store;
pub mod utils;
pub use shared::{models::*, error::*, session::*};

use rocket::{Build, Rocket};
use crate::catchers::{
    bad_request, forbidden, internal_error, not_found, too_many_requests, unauthorized, unprocessable,
};
use crate::routes::{
    add_wishlist_item, all_options, delete_wishlist_item, products_with_votes, submit_votes, top_voted,
    user_voted_products, AppState,
};

/// Assembles the HTTP service around an already-configured state.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    let cors = cors::CORS::new(state.settings.allowed_origin.clone());

    rocket::build()
        .attach(cors)
        .manage(state)
        .mount(
            "/api/votes",
            rocket::routes![
                products_with_votes,
                top_voted,
                user_voted_products,
                submit_votes,
                add_wishlist_item,
                delete_wishlist_item,
                all_options
            ],
        )
        .register(
            "/",
            rocket::catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                too_many_requests,
                internal_error
            ],
        )
}
