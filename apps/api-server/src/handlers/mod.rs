//! HTTP handlers and route configuration.

mod categories;
mod health;
mod posts;
mod thumbnails;


use actix_web::web;

use crate::middleware::error::{json_error_handler, path_error_handler};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .route("/posts", web::get().to(posts::list))
                .route("/posts/{id}", web::get().to(posts::get))
                .route("/categories", web::get().to(categories::list))
                .route("/categories/{id}", web::get().to(categories::get))
                // Admin routes, bearer token required
                .service(
                    web::scope("/admin")
                        .service(
                            web::resource("/posts")
                                .route(web::get().to(posts::admin_list))
                                .route(web::post().to(posts::create)),
                        )
                        .service(
                            web::resource("/posts/{id}")
                                .route(web::get().to(posts::admin_get))
                                .route(web::put().to(posts::update))
                                .route(web::delete().to(posts::delete)),
                        )
                        .service(
                            web::resource("/categories")
                                .route(web::get().to(categories::admin_list))
                                .route(web::post().to(categories::create)),
                        )
                        .service(
                            web::resource("/categories/{id}")
                                .route(web::get().to(categories::admin_get))
                                .route(web::put().to(categories::update))
                                .route(web::delete().to(categories::delete)),
                        )
                        .route("/thumbnails", web::post().to(thumbnails::upload)),
                ),
        );
}
