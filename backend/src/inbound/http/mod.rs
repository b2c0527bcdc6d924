//! HTTP inbound adapter serving the server-rendered screens.

pub mod auth;
pub mod error;
pub mod feed;
pub mod forms;
pub mod health;
pub mod posts;
mod renewal;
mod respond;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod views;

use actix_web::web;

pub use error::ApiResult;

/// Register every screen on `cfg`. Health checks are registered separately so they
/// stay outside the session middleware.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(feed::index)
        .service(feed::feed_window)
        .service(posts::create_form)
        .service(posts::create_post)
        .service(posts::show_post)
        .service(posts::edit_form)
        .service(posts::update_post)
        .service(posts::delete_post)
        .service(auth::login_form)
        .service(auth::login)
        .service(auth::signup_form)
        .service(auth::signup)
        .service(auth::verify)
        .service(auth::logout);
}
