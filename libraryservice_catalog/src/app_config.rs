use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(web::resource("/").route(web::get().to(handlers::book_list)))
        .service(web::resource("/about/").route(web::get().to(handlers::about)))
        .service(web::resource("/books/add/").route(web::post().to(handlers::add_book)))
        .service(
            web::scope("/book")
                .service(web::resource("/{slug}").route(web::get().to(handlers::book_detail)))
                .service(
                    web::resource("/{slug}/edit/").route(web::post().to(handlers::edit_book)),
                )
                .service(
                    web::resource("/{slug}/delete/").route(web::post().to(handlers::delete_book)),
                )
                .service(
                    web::resource("/{slug}/review/").route(web::post().to(handlers::add_review)),
                )
                .service(
                    web::resource("/{slug}/favorite/")
                        .route(web::post().to(handlers::toggle_favorite)),
                ),
        )
        .service(
            web::scope("/api")
                .service(
                    web::resource("/authors").route(web::get().to(handlers::get_all_authors)),
                )
                .service(
                    web::scope("/author")
                        .service(web::resource("").route(web::post().to(handlers::add_author)))
                        .service(
                            web::resource("/{author_id}")
                                .route(web::get().to(handlers::get_author))
                                .route(web::put().to(handlers::update_author))
                                .route(web::delete().to(handlers::delete_author)),
                        ),
                )
                .service(web::resource("/genres").route(web::get().to(handlers::get_all_genres)))
                .service(
                    web::scope("/genre")
                        .service(web::resource("").route(web::post().to(handlers::add_genre)))
                        .service(
                            web::resource("/{genre_id}")
                                .route(web::get().to(handlers::get_genre))
                                .route(web::put().to(handlers::rename_genre))
                                .route(web::delete().to(handlers::delete_genre)),
                        ),
                )
                .service(
                    web::resource("/publishers")
                        .route(web::get().to(handlers::get_all_publishers)),
                )
                .service(
                    web::scope("/publisher")
                        .service(web::resource("").route(web::post().to(handlers::add_publisher)))
                        .service(
                            web::resource("/{publisher_id}")
                                .route(web::get().to(handlers::get_publisher))
                                .route(web::put().to(handlers::update_publisher))
                                .route(web::delete().to(handlers::delete_publisher)),
                        ),
                )
                .service(web::resource("/users").route(web::get().to(handlers::get_all_users)))
                .service(
                    web::scope("/user")
                        .service(web::resource("").route(web::post().to(handlers::add_user)))
                        .service(
                            web::resource("/{user_id}").route(web::get().to(handlers::get_user)),
                        ),
                ),
        );
}
