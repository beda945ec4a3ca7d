use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::{Error, HttpRequest, HttpResponse};
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{
    AuthorDetails, AuthorId, BookDetailPage, BookDetailsPatch, BookListPage, GenreId, GenreRecord,
    ListQuery, NewBook, NewGenre, PublisherDetails, PublisherId, ReviewForm, UserDetails, UserId,
};
use crate::auth;
use crate::catalog_repository::{CatalogRepository, CatalogRepositoryError};
use crate::favorites_repository::{FavoritesRepository, FavoritesRepositoryError};
use crate::reviews_repository::{ReviewsRepository, ReviewsRepositoryError};
use crate::users_repository::{UsersRepository, UsersRepositoryError};

/// Books per page of the list view.
const PAGE_SIZE: u32 = 5;

fn redirect_to(path: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((LOCATION, path.to_string()))
        .finish()
}

fn detail_path(slug: &str) -> String {
    format!("/book/{}", slug)
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn about() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().json(serde_json::json!({ "page": "about" })))
}

#[api_v2_operation]
pub async fn book_list(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, Error> {
    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Ok(HttpResponse::NotFound().finish());
    }

    let count = match catalog_repository.count_books().await {
        Ok(count) => count,
        Err(err) => {
            tracing::error!("Count books failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    // an empty catalog still renders one (empty) page
    let num_pages = (count.div_ceil(PAGE_SIZE as u64)).max(1) as u32;
    if page > num_pages {
        return Ok(HttpResponse::NotFound().finish());
    }

    match catalog_repository
        .list_books(Some(PAGE_SIZE), (page - 1) * PAGE_SIZE)
        .await
    {
        Ok(books) => Ok(HttpResponse::Ok().json(BookListPage {
            books,
            page,
            num_pages,
        })),
        Err(err) => {
            tracing::error!("List books failed {}", err);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

#[api_v2_operation]
pub async fn book_detail(
    req: HttpRequest,
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    reviews_repository: web::Data<Arc<dyn ReviewsRepository>>,
    favorites_repository: web::Data<Arc<dyn FavoritesRepository>>,
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    slug: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let book = match catalog_repository.get_book_by_slug(&slug).await {
        Ok(book) => book,
        Err(CatalogRepositoryError::SlugNotFound(_)) => {
            return Ok(HttpResponse::NotFound().finish());
        }
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let reviews = match reviews_repository.list_reviews_for_book(book.book_id).await {
        Ok(reviews) => reviews,
        Err(err) => {
            tracing::error!("List reviews failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let viewer = match auth::authenticated_user(&req, users_repository.get_ref().as_ref()).await {
        Ok(viewer) => viewer,
        Err(err) => {
            tracing::error!("Resolve user failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let is_favorite = match viewer {
        Some(user_id) => match favorites_repository.is_favorite(book.book_id, user_id).await {
            Ok(is_favorite) => is_favorite,
            Err(err) => {
                tracing::error!("Check favorite failed {}", err);
                return Ok(HttpResponse::InternalServerError().finish());
            }
        },
        None => false,
    };

    Ok(HttpResponse::Ok().json(BookDetailPage {
        book,
        reviews,
        review_form: ReviewForm::default(),
        is_favorite,
    }))
}

#[api_v2_operation]
pub async fn add_book(
    req: HttpRequest,
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    details: web::Json<NewBook>,
) -> Result<HttpResponse, Error> {
    let viewer = match auth::authenticated_user(&req, users_repository.get_ref().as_ref()).await {
        Ok(viewer) => viewer,
        Err(err) => {
            tracing::error!("Resolve user failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    if viewer.is_none() {
        return Ok(auth::redirect_to_login());
    }

    match catalog_repository.add_book(details.into_inner()).await {
        Ok(_) => Ok(redirect_to("/")),
        Err(
            err @ (CatalogRepositoryError::AuthorNotFound(_)
            | CatalogRepositoryError::GenreNotFound(_)
            | CatalogRepositoryError::PublisherNotFound(_)),
        ) => Ok(HttpResponse::BadRequest().json(err.to_string())),
        Err(err @ CatalogRepositoryError::DuplicateSlug(_)) => {
            Ok(HttpResponse::Conflict().json(err.to_string()))
        }
        Err(err) => {
            tracing::error!("Add book failed {}", err);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

#[api_v2_operation]
pub async fn edit_book(
    req: HttpRequest,
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    slug: web::Path<String>,
    details: web::Json<NewBook>,
) -> Result<HttpResponse, Error> {
    let viewer = match auth::authenticated_user(&req, users_repository.get_ref().as_ref()).await {
        Ok(viewer) => viewer,
        Err(err) => {
            tracing::error!("Resolve user failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    if viewer.is_none() {
        return Ok(auth::redirect_to_login());
    }

    let book = match catalog_repository.get_book_by_slug(&slug).await {
        Ok(book) => book,
        Err(CatalogRepositoryError::SlugNotFound(_)) => {
            return Ok(HttpResponse::NotFound().finish());
        }
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    match catalog_repository
        .update_book(book.book_id, BookDetailsPatch::from(details.into_inner()))
        .await
    {
        Ok(true) => Ok(redirect_to("/")),
        Ok(false) => Ok(HttpResponse::NotFound().finish()),
        Err(
            err @ (CatalogRepositoryError::AuthorNotFound(_)
            | CatalogRepositoryError::GenreNotFound(_)
            | CatalogRepositoryError::PublisherNotFound(_)),
        ) => Ok(HttpResponse::BadRequest().json(err.to_string())),
        Err(err) => {
            tracing::error!("Update book failed {}", err);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

#[api_v2_operation]
pub async fn delete_book(
    req: HttpRequest,
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    reviews_repository: web::Data<Arc<dyn ReviewsRepository>>,
    favorites_repository: web::Data<Arc<dyn FavoritesRepository>>,
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    slug: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let viewer = match auth::authenticated_user(&req, users_repository.get_ref().as_ref()).await {
        Ok(viewer) => viewer,
        Err(err) => {
            tracing::error!("Resolve user failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    if viewer.is_none() {
        return Ok(auth::redirect_to_login());
    }

    let book = match catalog_repository.get_book_by_slug(&slug).await {
        Ok(book) => book,
        Err(CatalogRepositoryError::SlugNotFound(_)) => {
            return Ok(HttpResponse::NotFound().finish());
        }
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    match catalog_repository.delete_book(book.book_id).await {
        Ok(true) => {}
        Ok(false) => return Ok(HttpResponse::NotFound().finish()),
        Err(err) => {
            tracing::error!("Delete book failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    }
    // reviews and favorites of a removed book go with it
    if let Err(err) = reviews_repository
        .delete_reviews_for_book(book.book_id)
        .await
    {
        tracing::error!("Cascade reviews failed {}", err);
        return Ok(HttpResponse::InternalServerError().finish());
    }
    if let Err(err) = favorites_repository
        .delete_favorites_for_book(book.book_id)
        .await
    {
        tracing::error!("Cascade favorites failed {}", err);
        return Ok(HttpResponse::InternalServerError().finish());
    }

    Ok(redirect_to("/"))
}

#[api_v2_operation]
pub async fn add_review(
    req: HttpRequest,
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    reviews_repository: web::Data<Arc<dyn ReviewsRepository>>,
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    slug: web::Path<String>,
    form: web::Json<ReviewForm>,
) -> Result<HttpResponse, Error> {
    let viewer = match auth::authenticated_user(&req, users_repository.get_ref().as_ref()).await {
        Ok(viewer) => viewer,
        Err(err) => {
            tracing::error!("Resolve user failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let user_id = match viewer {
        Some(user_id) => user_id,
        None => return Ok(auth::redirect_to_login()),
    };

    let book = match catalog_repository.get_book_by_slug(&slug).await {
        Ok(book) => book,
        Err(CatalogRepositoryError::SlugNotFound(_)) => {
            return Ok(HttpResponse::NotFound().finish());
        }
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let form = form.into_inner();
    if form.rating == 0 {
        // invalid form: nothing is saved, the detail view is shown again
        tracing::warn!("Dropping review with rating 0 for book {}", book.book_id);
        return Ok(redirect_to(&detail_path(&slug)));
    }

    match reviews_repository
        .add_review(book.book_id, user_id, form)
        .await
    {
        Ok(_) => Ok(redirect_to(&detail_path(&slug))),
        // a second review by the same user is dropped, the redirect happens anyway
        Err(ReviewsRepositoryError::AlreadyReviewed { book_id, user_id }) => {
            tracing::warn!("User {} already reviewed book {}", user_id, book_id);
            Ok(redirect_to(&detail_path(&slug)))
        }
        Err(err) => {
            tracing::error!("Add review failed {}", err);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

#[api_v2_operation]
pub async fn toggle_favorite(
    req: HttpRequest,
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    favorites_repository: web::Data<Arc<dyn FavoritesRepository>>,
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    slug: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let viewer = match auth::authenticated_user(&req, users_repository.get_ref().as_ref()).await {
        Ok(viewer) => viewer,
        Err(err) => {
            tracing::error!("Resolve user failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };
    let user_id = match viewer {
        Some(user_id) => user_id,
        None => return Ok(auth::redirect_to_login()),
    };

    let book = match catalog_repository.get_book_by_slug(&slug).await {
        Ok(book) => book,
        Err(CatalogRepositoryError::SlugNotFound(_)) => {
            return Ok(HttpResponse::NotFound().finish());
        }
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let is_favorite = match favorites_repository.is_favorite(book.book_id, user_id).await {
        Ok(is_favorite) => is_favorite,
        Err(err) => {
            tracing::error!("Check favorite failed {}", err);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let result = if is_favorite {
        favorites_repository
            .remove_favorite(book.book_id, user_id)
            .await
            .map(|_| ())
    } else {
        favorites_repository
            .add_favorite(book.book_id, user_id)
            .await
    };

    match result {
        Ok(()) => Ok(redirect_to(&detail_path(&slug))),
        // lost the race with another submit; the end state is toggled either way
        Err(FavoritesRepositoryError::AlreadyFavorite { book_id, user_id }) => {
            tracing::warn!("Book {} already favorited by user {}", book_id, user_id);
            Ok(redirect_to(&detail_path(&slug)))
        }
        Err(err) => {
            tracing::error!("Toggle favorite failed {}", err);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

#[api_v2_operation]
pub async fn get_all_authors(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match catalog_repository.list_authors().await {
        Ok(authors) => HttpResponse::Ok().json(authors),
        Err(err) => {
            tracing::error!("List authors failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_author(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    details: web::Json<AuthorDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository.add_author(details.into_inner()).await {
            Ok(author_id) => HttpResponse::Ok()
                .append_header((LOCATION, format!("/api/author/{}", author_id)))
                .finish(),
            Err(err) => {
                tracing::error!("Add author failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_author(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    author_id: web::Path<AuthorId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository.get_author(author_id.into_inner()).await {
            Ok(details) => HttpResponse::Ok().json(details),
            Err(CatalogRepositoryError::AuthorNotFound(_)) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Get author failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn update_author(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    author_id: web::Path<AuthorId>,
    details: web::Json<AuthorDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository
            .update_author(author_id.into_inner(), details.into_inner())
            .await
        {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Update author failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn delete_author(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    author_id: web::Path<AuthorId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository
            .delete_author(author_id.into_inner())
            .await
        {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Delete author failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_all_genres(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match catalog_repository.list_genres().await {
        Ok(genres) => HttpResponse::Ok().json(genres),
        Err(err) => {
            tracing::error!("List genres failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_genre(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    details: web::Json<NewGenre>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository.add_genre(details.into_inner().name).await {
            Ok(genre_id) => HttpResponse::Ok()
                .append_header((LOCATION, format!("/api/genre/{}", genre_id)))
                .finish(),
            Err(err @ CatalogRepositoryError::DuplicateGenre(_)) => {
                HttpResponse::Conflict().json(err.to_string())
            }
            Err(err) => {
                tracing::error!("Add genre failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_genre(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    genre_id: web::Path<GenreId>,
) -> Result<HttpResponse, Error> {
    let genre_id = genre_id.into_inner();
    Ok(match catalog_repository.get_genre(genre_id).await {
        Ok(name) => HttpResponse::Ok().json(GenreRecord { genre_id, name }),
        Err(CatalogRepositoryError::GenreNotFound(_)) => HttpResponse::NotFound().finish(),
        Err(err) => {
            tracing::error!("Get genre failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn rename_genre(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    genre_id: web::Path<GenreId>,
    details: web::Json<NewGenre>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository
            .rename_genre(genre_id.into_inner(), details.into_inner().name)
            .await
        {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => HttpResponse::NotFound().finish(),
            Err(err @ CatalogRepositoryError::DuplicateGenre(_)) => {
                HttpResponse::Conflict().json(err.to_string())
            }
            Err(err) => {
                tracing::error!("Rename genre failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn delete_genre(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    genre_id: web::Path<GenreId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository.delete_genre(genre_id.into_inner()).await {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Delete genre failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_all_publishers(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match catalog_repository.list_publishers().await {
        Ok(publishers) => HttpResponse::Ok().json(publishers),
        Err(err) => {
            tracing::error!("List publishers failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_publisher(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    details: web::Json<PublisherDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository
            .add_publisher(details.into_inner())
            .await
        {
            Ok(publisher_id) => HttpResponse::Ok()
                .append_header((LOCATION, format!("/api/publisher/{}", publisher_id)))
                .finish(),
            Err(err) => {
                tracing::error!("Add publisher failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_publisher(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    publisher_id: web::Path<PublisherId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository
            .get_publisher(publisher_id.into_inner())
            .await
        {
            Ok(details) => HttpResponse::Ok().json(details),
            Err(CatalogRepositoryError::PublisherNotFound(_)) => {
                HttpResponse::NotFound().finish()
            }
            Err(err) => {
                tracing::error!("Get publisher failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn update_publisher(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    publisher_id: web::Path<PublisherId>,
    details: web::Json<PublisherDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository
            .update_publisher(publisher_id.into_inner(), details.into_inner())
            .await
        {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Update publisher failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn delete_publisher(
    catalog_repository: web::Data<Arc<dyn CatalogRepository>>,
    publisher_id: web::Path<PublisherId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match catalog_repository
            .delete_publisher(publisher_id.into_inner())
            .await
        {
            Ok(true) => HttpResponse::Ok().finish(),
            Ok(false) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Delete publisher failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_all_users(
    users_repository: web::Data<Arc<dyn UsersRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match users_repository.get_all_user_ids().await {
        Ok(user_ids) => HttpResponse::Ok().json(user_ids),
        Err(err) => {
            tracing::error!("List users failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn add_user(
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    details: web::Json<UserDetails>,
) -> Result<HttpResponse, Error> {
    Ok(
        match users_repository.add_user(details.into_inner()).await {
            Ok(user_id) => HttpResponse::Ok()
                .append_header((LOCATION, format!("/api/user/{}", user_id)))
                .finish(),
            Err(err @ UsersRepositoryError::DuplicateUsername(_)) => {
                HttpResponse::Conflict().json(err.to_string())
            }
            Err(err) => {
                tracing::error!("Add user failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[api_v2_operation]
pub async fn get_user(
    users_repository: web::Data<Arc<dyn UsersRepository>>,
    user_id: web::Path<UserId>,
) -> Result<HttpResponse, Error> {
    Ok(
        match users_repository.get_user(user_id.into_inner()).await {
            Ok(details) => HttpResponse::Ok().json(details),
            Err(UsersRepositoryError::UserNotFound(_)) => HttpResponse::NotFound().finish(),
            Err(err) => {
                tracing::error!("Get user failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[cfg(test)]
mod handler_tests {
    use std::sync::Arc;

    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use paperclip::actix::web::Data;
    use paperclip::actix::OpenApiExt;

    use crate::api::{
        AuthorDetails, AuthorId, BookDetailPage, BookListPage, BookRecord, GenreId, NewBook,
        PublisherId, ReviewForm, UserDetails, UserId,
    };
    use crate::app_config::config_app;
    use crate::auth;
    use crate::catalog_repository::{CatalogRepository, InMemoryCatalogRepository};
    use crate::favorites_repository::{FavoritesRepository, InMemoryFavoritesRepository};
    use crate::reviews_repository::{InMemoryReviewsRepository, ReviewsRepository};
    use crate::users_repository::{InMemoryUsersRepository, UsersRepository};

    struct TestBackend {
        catalog: Arc<dyn CatalogRepository>,
        reviews: Arc<dyn ReviewsRepository>,
        favorites: Arc<dyn FavoritesRepository>,
        users: Arc<dyn UsersRepository>,
    }

    impl TestBackend {
        fn new() -> Self {
            Self {
                catalog: Arc::new(InMemoryCatalogRepository::default()),
                reviews: Arc::new(InMemoryReviewsRepository::default()),
                favorites: Arc::new(InMemoryFavoritesRepository::default()),
                users: Arc::new(InMemoryUsersRepository::default()),
            }
        }

        async fn seed_references(&self) -> (AuthorId, GenreId, PublisherId) {
            let author_id = self
                .catalog
                .add_author(AuthorDetails {
                    first_name: "Frank".to_string(),
                    last_name: "Herbert".to_string(),
                })
                .await
                .unwrap();
            let genre_id = self
                .catalog
                .add_genre("Science Fiction".to_string())
                .await
                .unwrap();
            let publisher_id = self
                .catalog
                .add_publisher(crate::api::PublisherDetails {
                    name: "Chilton".to_string(),
                    website: None,
                })
                .await
                .unwrap();
            (author_id, genre_id, publisher_id)
        }

        async fn seed_user(&self, username: &str) -> UserId {
            self.users
                .add_user(UserDetails {
                    username: username.to_string(),
                })
                .await
                .unwrap()
        }

        async fn seed_book(&self, title: &str, author_id: AuthorId, genre_id: GenreId) -> BookRecord {
            self.catalog
                .add_book(NewBook {
                    title: title.to_string(),
                    subtitle: String::new(),
                    publish_date: "1965-08-01".to_string(),
                    authors: vec![author_id],
                    genres: vec![genre_id],
                    summary: "A story".to_string(),
                    publisher: None,
                })
                .await
                .unwrap()
        }
    }

    macro_rules! init_test_app {
        ($backend:expr) => {
            test::init_service(
                App::new()
                    .wrap_api()
                    .app_data(Data::new($backend.catalog.clone()))
                    .app_data(Data::new($backend.reviews.clone()))
                    .app_data(Data::new($backend.favorites.clone()))
                    .app_data(Data::new($backend.users.clone()))
                    .configure(config_app)
                    .build(),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_book_list_pagination() {
        let backend = TestBackend::new();
        let (author_id, genre_id, _) = backend.seed_references().await;
        for no in 0..6 {
            backend
                .seed_book(&format!("Book {}", no), author_id, genre_id)
                .await;
        }
        let app = init_test_app!(backend);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page: BookListPage = test::read_body_json(resp).await;
        assert_eq!(page.books.len(), 5);
        assert_eq!(page.page, 1);
        assert_eq!(page.num_pages, 2);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/?page=2").to_request(),
        )
        .await;
        let page: BookListPage = test::read_body_json(resp).await;
        assert_eq!(page.books.len(), 1);

        // pages past the end and page zero are not found
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/?page=3").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/?page=0").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_book_detail_context() {
        let backend = TestBackend::new();
        let (author_id, genre_id, _) = backend.seed_references().await;
        let book = backend.seed_book("Dune", author_id, genre_id).await;
        let user_id = backend.seed_user("reader").await;

        backend
            .reviews
            .add_review(
                book.book_id,
                user_id,
                ReviewForm {
                    rating: 5,
                    comment: "Loved it".to_string(),
                },
            )
            .await
            .unwrap();
        backend
            .favorites
            .add_favorite(book.book_id, user_id)
            .await
            .unwrap();

        let app = init_test_app!(backend);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/book/missing").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        // anonymous viewer sees the reviews but no favorite flag
        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/book/dune").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let page: BookDetailPage = test::read_body_json(resp).await;
        assert_eq!(page.book.slug, "dune");
        assert_eq!(page.reviews.len(), 1);
        assert_eq!(page.review_form, ReviewForm::default());
        assert_eq!(page.review_form.rating, 1);
        assert!(!page.is_favorite);

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/book/dune")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .to_request(),
        )
        .await;
        let page: BookDetailPage = test::read_body_json(resp).await;
        assert!(page.is_favorite);
    }

    #[actix_web::test]
    async fn test_mutating_routes_redirect_to_login() {
        let backend = TestBackend::new();
        let (author_id, genre_id, _) = backend.seed_references().await;
        let book = backend.seed_book("Dune", author_id, genre_id).await;
        let input = NewBook {
            title: "Dune".to_string(),
            subtitle: String::new(),
            publish_date: "1965-08-01".to_string(),
            authors: vec![author_id],
            genres: vec![genre_id],
            summary: String::new(),
            publisher: None,
        };
        let app = init_test_app!(backend);

        let requests = vec![
            test::TestRequest::post()
                .uri("/books/add/")
                .set_json(&input)
                .to_request(),
            test::TestRequest::post()
                .uri(&format!("/book/{}/edit/", book.slug))
                .set_json(&input)
                .to_request(),
            test::TestRequest::post()
                .uri(&format!("/book/{}/delete/", book.slug))
                .to_request(),
            test::TestRequest::post()
                .uri(&format!("/book/{}/review/", book.slug))
                .set_json(&ReviewForm::default())
                .to_request(),
            test::TestRequest::post()
                .uri(&format!("/book/{}/favorite/", book.slug))
                .to_request(),
        ];
        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FOUND);
            assert_eq!(
                resp.headers().get(header::LOCATION).unwrap(),
                auth::LOGIN_URL
            );
        }
    }

    #[actix_web::test]
    async fn test_add_edit_and_delete_book() {
        let backend = TestBackend::new();
        let (author_id, genre_id, publisher_id) = backend.seed_references().await;
        let user_id = backend.seed_user("editor").await;
        let app = init_test_app!(backend);

        let mut input = NewBook {
            title: "Dune".to_string(),
            subtitle: String::new(),
            publish_date: "1965-08-01".to_string(),
            authors: vec![author_id],
            genres: vec![genre_id],
            summary: "Spice".to_string(),
            publisher: Some(publisher_id),
        };

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/books/add/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .set_json(&input)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

        let book = backend.catalog.get_book_by_slug("dune").await.unwrap();
        assert_eq!(book.details.title, "Dune");

        // unknown author id in the form is a bad request
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/books/add/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .set_json(&NewBook {
                    authors: vec![author_id + 1000],
                    ..input.clone()
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        input.title = "Dune Messiah".to_string();
        input.publisher = None;
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/edit/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .set_json(&input)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let book = backend.catalog.get_book(book.book_id).await.unwrap();
        assert_eq!(book.details.title, "Dune Messiah");
        assert_eq!(book.details.publisher, None);
        // the slug stays with the book for good
        assert_eq!(book.slug, "dune");

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/missing/edit/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .set_json(&input)
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/delete/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(backend.catalog.get_book(book.book_id).await.is_err());
    }

    #[actix_web::test]
    async fn test_delete_book_cascades_reviews_and_favorites() {
        let backend = TestBackend::new();
        let (author_id, genre_id, _) = backend.seed_references().await;
        let book = backend.seed_book("Dune", author_id, genre_id).await;
        let user_id = backend.seed_user("reader").await;
        backend
            .reviews
            .add_review(book.book_id, user_id, ReviewForm::default())
            .await
            .unwrap();
        backend
            .favorites
            .add_favorite(book.book_id, user_id)
            .await
            .unwrap();
        let app = init_test_app!(backend);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/delete/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        assert!(backend
            .reviews
            .list_reviews_for_book(book.book_id)
            .await
            .unwrap()
            .is_empty());
        assert!(!backend
            .favorites
            .is_favorite(book.book_id, user_id)
            .await
            .unwrap());
    }

    #[actix_web::test]
    async fn test_add_review_and_silent_duplicate_drop() {
        let backend = TestBackend::new();
        let (author_id, genre_id, _) = backend.seed_references().await;
        let book = backend.seed_book("Dune", author_id, genre_id).await;
        let user_id = backend.seed_user("reader").await;
        let app = init_test_app!(backend);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/missing/review/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .set_json(&ReviewForm::default())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/review/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .set_json(&ReviewForm {
                    rating: 4,
                    comment: "Solid".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/book/dune"
        );

        // the second submission is dropped but the redirect is identical
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/review/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .set_json(&ReviewForm {
                    rating: 1,
                    comment: "Changed my mind".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        // a zero rating never validates, nothing is stored
        let other_user = backend.seed_user("other").await;
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/review/")
                .insert_header((auth::USER_ID_HEADER, other_user.to_string()))
                .set_json(&ReviewForm {
                    rating: 0,
                    comment: String::new(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);

        let reviews = backend
            .reviews
            .list_reviews_for_book(book.book_id)
            .await
            .unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].details.rating, 4);
        assert_eq!(reviews[0].details.comment, "Solid");
    }

    #[actix_web::test]
    async fn test_toggle_favorite_twice_restores_state() {
        let backend = TestBackend::new();
        let (author_id, genre_id, _) = backend.seed_references().await;
        let book = backend.seed_book("Dune", author_id, genre_id).await;
        let user_id = backend.seed_user("reader").await;
        let app = init_test_app!(backend);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/missing/favorite/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/favorite/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(backend
            .favorites
            .is_favorite(book.book_id, user_id)
            .await
            .unwrap());

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/book/dune/favorite/")
                .insert_header((auth::USER_ID_HEADER, user_id.to_string()))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert!(!backend
            .favorites
            .is_favorite(book.book_id, user_id)
            .await
            .unwrap());
    }

    #[actix_web::test]
    async fn test_management_api() {
        let backend = TestBackend::new();
        let app = init_test_app!(backend);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/author")
                .set_json(&AuthorDetails {
                    first_name: "Ursula".to_string(),
                    last_name: "LeGuin".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(location.starts_with("/api/author/"));

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri(&location).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let details: AuthorDetails = test::read_body_json(resp).await;
        assert_eq!(details.first_name, "Ursula");

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/author/999").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/genre")
                .set_json(&crate::api::NewGenre {
                    name: "Fantasy".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/genre")
                .set_json(&crate::api::NewGenre {
                    name: "Fantasy".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/user")
                .set_json(&UserDetails {
                    username: "reader".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/user")
                .set_json(&UserDetails {
                    username: "reader".to_string(),
                })
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }
}
