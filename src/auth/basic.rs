use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::{self, HeaderValue},
    web, Error, ResponseError,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::config::BasicAuthConfig;
use crate::error::AppError;

const CHALLENGE: &str = "Basic realm=\"restricted\", charset=\"UTF-8\"";

/// Guards operator-only routes with HTTP Basic credentials.
///
/// The expected user and password come from `web::Data<BasicAuthConfig>`.
/// Rejections answer 401 with a `WWW-Authenticate` challenge.
pub struct BasicAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for BasicAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = BasicAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BasicAuthMiddlewareService { service }))
    }
}

pub struct BasicAuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for BasicAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match check_credentials(&req) {
            Ok(()) => Box::pin(self.service.call(req)),
            Err(app_err @ AppError::Unauthorized(_)) => {
                let err = challenge(app_err);
                Box::pin(async move { Err(err) })
            }
            Err(app_err) => Box::pin(async move { Err(app_err.into()) }),
        }
    }
}

fn challenge(app_err: AppError) -> Error {
    let mut response = app_err.error_response();
    response
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
    InternalError::from_response(app_err, response).into()
}

/// Splits an `Authorization: Basic ...` value into user and password.
fn decode_basic(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = String::from_utf8(BASE64.decode(encoded).ok()?).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn check_credentials(req: &ServiceRequest) -> Result<(), AppError> {
    let expected = req.app_data::<web::Data<BasicAuthConfig>>().ok_or_else(|| {
        AppError::InternalServerError("BasicAuthConfig is not registered as app data".into())
    })?;

    let (user, pass) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(decode_basic)
        .ok_or_else(|| AppError::Unauthorized("missing or malformed basic credentials".into()))?;

    if user != expected.user || pass != expected.pass {
        log::warn!("rejected basic credentials for {} on {}", user, req.path());
        return Err(AppError::Unauthorized("invalid credentials".into()));
    }
    Ok(())
}
