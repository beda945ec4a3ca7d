use actix_web::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(web::resource("/books/").route(web::get().to(handlers::list_books)))
        .service(
            web::scope("/books")
                .service(web::resource("/{book_id}").route(web::get().to(handlers::get_book)))
                .service(
                    web::resource("/{book_id}/reviews")
                        .route(web::get().to(handlers::get_reviews)),
                ),
        );
}
