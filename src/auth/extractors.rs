use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

/// The authenticated caller's user id, as placed in the request extensions by
/// `AuthMiddleware`.
///
/// Missing extensions mean the middleware did not run for this route, which is
/// answered with `AppError::Unauthorized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i64);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let caller: Result<Self, ActixError> = req
            .extensions()
            .get::<AuthenticatedUserId>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no authenticated caller".into()).into());
        ready(caller)
    }
}
