//! HTTP handlers and route configuration.

mod auth;
mod bookmarks;
mod comments;
mod dashboard;
mod health;
mod posts;
mod tags;

use actix_web::web;

use crate::middleware::rate_limit::LoginRateLimit;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .route("/articles/{slug}", web::get().to(posts::get_article))
            .route("/tags/{slug}", web::get().to(tags::get_tag))
            .route("/developers", web::get().to(dashboard::developers))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .service(
                        web::resource("/callback/credentials")
                            .wrap(LoginRateLimit)
                            .route(web::post().to(auth::sign_in_credentials)),
                    )
                    .route("/callback/{provider}", web::post().to(auth::sign_in_external))
                    .route("/session", web::get().to(auth::session))
                    .route("/signout", web::post().to(auth::sign_out)),
            )
            // Session-scoped routes
            .route("/dashboard", web::get().to(dashboard::dashboard))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/comments", web::get().to(comments::list_comments))
                    .route("/{id}/comments", web::post().to(comments::create_comment))
                    .route("/{id}/bookmark", web::post().to(bookmarks::add_bookmark))
                    .route("/{id}/bookmark", web::delete().to(bookmarks::remove_bookmark)),
            ),
    );
}
