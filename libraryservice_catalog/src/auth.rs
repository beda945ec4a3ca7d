use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse};

use crate::api::UserId;
use crate::users_repository::{UsersRepository, UsersRepositoryError};

/// Where unauthenticated requests to mutating actions are sent.
pub const LOGIN_URL: &str = "/accounts/login/";

/// Header carrying the id of the requesting user.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Resolves the requesting user from the [`USER_ID_HEADER`] header.
/// A missing or malformed header, or an id no user has, yields None.
pub async fn authenticated_user(
    req: &HttpRequest,
    users_repository: &dyn UsersRepository,
) -> Result<Option<UserId>, UsersRepositoryError> {
    let user_id = match req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<UserId>().ok())
    {
        Some(user_id) => user_id,
        None => return Ok(None),
    };

    match users_repository.get_user(user_id).await {
        Ok(_) => Ok(Some(user_id)),
        Err(UsersRepositoryError::UserNotFound(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

pub fn redirect_to_login() -> HttpResponse {
    HttpResponse::Found()
        .append_header((LOCATION, LOGIN_URL))
        .finish()
}
