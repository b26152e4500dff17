use crate::{
    auth::{AuthResponse, LoginRequest, RegisterRequest, TokenService},
    error::AppError,
    routes::envelope,
    services::UserDirectory,
};
use actix_web::{http::StatusCode, post, web, HttpResponse};
use validator::Validate;

/// Register a new user
///
/// `POST /api/v1/user/create` with `{username, email, password}`. Answers 200 with
/// an empty body; a taken username or email is a 409.
#[post("/create")]
pub async fn register(
    users: web::Data<UserDirectory>,
    register_data: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    register_data.validate()?;

    let RegisterRequest {
        username,
        email,
        password,
    } = register_data.into_inner();
    users.register(&username, &email, password).await?;

    Ok(HttpResponse::Ok().finish())
}

/// Login user
///
/// `POST /api/v1/user/login` with `{email, password}`. Returns `{token, userID}`,
/// with `userID` as a decimal string.
/// Unknown email and wrong password both answer 401.
#[post("/login")]
pub async fn login(
    users: web::Data<UserDirectory>,
    tokens: web::Data<TokenService>,
    login_data: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    login_data.validate()?;

    let LoginRequest { email, password } = login_data.into_inner();
    let user = users.authenticate(&email, password).await?;
    let token = tokens.issue(user.id)?;

    Ok(envelope(
        StatusCode::OK,
        AuthResponse {
            token,
            user_id: user.id.to_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::store::MemoryUserStore;
    use actix_web::{test, App};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn tokens() -> TokenService {
        TokenService::new(&TokenConfig {
            secret: "route_test_secret".into(),
            issuer: "open-todo".into(),
            ttl: Duration::from_secs(3600),
        })
    }

    #[actix_rt::test]
    async fn test_register_validation() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(UserDirectory::new(Arc::new(
                    MemoryUserStore::new(),
                ))))
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/create")
            .set_json(json!({
                "username": "test",
                "email": "invalid-email",
                "password": "password123"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/create")
            .set_json(json!({
                "username": "test",
                "email": "test@example.com",
                "password": "short"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_login_returns_verifiable_token() {
        let users = UserDirectory::new(Arc::new(MemoryUserStore::new()));
        let user = users
            .register("dave", "dave@example.com", "password123".into())
            .await
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(users))
                .app_data(web::Data::new(tokens()))
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "dave@example.com", "password": "password123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["userID"], user.id.to_string());
        let token = body["data"]["token"].as_str().unwrap();
        assert_eq!(tokens().validate(token).unwrap().user_id(), Ok(user.id));

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "dave@example.com", "password": "wrong-password" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
