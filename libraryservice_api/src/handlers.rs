use std::collections::HashMap;
use std::sync::Arc;

use actix_web::web::{Data, Path};
use actix_web::HttpResponse;

use libraryservice_catalog::api::{AuthorId, BookId, BookRecord};
use libraryservice_catalog::catalog_repository::{CatalogRepository, CatalogRepositoryError};
use libraryservice_catalog::reviews_repository::ReviewsRepository;
use libraryservice_catalog::users_repository::UsersRepository;

use crate::api::{BookResponse, ReviewResponse};

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().finish()
}

fn project_book(book: BookRecord, first_names: &HashMap<AuthorId, String>) -> BookResponse {
    BookResponse {
        id: book.book_id,
        title: book.details.title,
        author: book
            .details
            .authors
            .iter()
            .filter_map(|author_id| first_names.get(author_id).cloned())
            .collect(),
        description: book.details.summary,
    }
}

async fn author_first_names(
    catalog_repository: &dyn CatalogRepository,
) -> Result<HashMap<AuthorId, String>, CatalogRepositoryError> {
    Ok(catalog_repository
        .list_authors()
        .await?
        .into_iter()
        .map(|author| (author.author_id, author.details.first_name))
        .collect())
}

pub async fn list_books(
    catalog_repository: Data<Arc<dyn CatalogRepository>>,
) -> HttpResponse {
    let books = match catalog_repository.list_books(None, 0).await {
        Ok(books) => books,
        Err(err) => {
            tracing::error!("List books failed {}", err);
            return HttpResponse::InternalServerError().finish();
        }
    };
    let first_names = match author_first_names(catalog_repository.get_ref().as_ref()).await {
        Ok(first_names) => first_names,
        Err(err) => {
            tracing::error!("List authors failed {}", err);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let records: Vec<BookResponse> = books
        .into_iter()
        .map(|book| project_book(book, &first_names))
        .collect();
    HttpResponse::Ok().json(records)
}

pub async fn get_book(
    catalog_repository: Data<Arc<dyn CatalogRepository>>,
    book_id: Path<BookId>,
) -> HttpResponse {
    let book = match catalog_repository.get_book(book_id.into_inner()).await {
        Ok(book) => book,
        Err(CatalogRepositoryError::BookNotFound(_)) => {
            return HttpResponse::NotFound().finish();
        }
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            return HttpResponse::InternalServerError().finish();
        }
    };
    let first_names = match author_first_names(catalog_repository.get_ref().as_ref()).await {
        Ok(first_names) => first_names,
        Err(err) => {
            tracing::error!("List authors failed {}", err);
            return HttpResponse::InternalServerError().finish();
        }
    };

    HttpResponse::Ok().json(project_book(book, &first_names))
}

pub async fn get_reviews(
    catalog_repository: Data<Arc<dyn CatalogRepository>>,
    reviews_repository: Data<Arc<dyn ReviewsRepository>>,
    users_repository: Data<Arc<dyn UsersRepository>>,
    book_id: Path<BookId>,
) -> HttpResponse {
    let book_id = book_id.into_inner();
    match catalog_repository.get_book(book_id).await {
        Ok(_) => {}
        Err(CatalogRepositoryError::BookNotFound(_)) => {
            return HttpResponse::NotFound().finish();
        }
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            return HttpResponse::InternalServerError().finish();
        }
    }

    let reviews = match reviews_repository.list_reviews_for_book(book_id).await {
        Ok(reviews) => reviews,
        Err(err) => {
            tracing::error!("List reviews failed {}", err);
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut records = Vec::with_capacity(reviews.len());
    for review in reviews {
        let username = match users_repository.get_user(review.user_id).await {
            Ok(details) => details.username,
            Err(err) => {
                tracing::error!("Get user failed {}", err);
                return HttpResponse::InternalServerError().finish();
            }
        };
        records.push(ReviewResponse {
            id: review.review_id,
            user: username,
            rating: review.details.rating,
            comment: review.details.comment,
        });
    }
    HttpResponse::Ok().json(records)
}
