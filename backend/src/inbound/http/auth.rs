//! Authentication endpoints: login, logout, and the current-user read.
//!
//! Credential verification goes through the `LoginService` port; the session
//! cookie carries only the user id.

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::User;
use crate::domain::Error;

use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Login request payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    pub email: String,
    pub password: String,
}

/// Seller-application sub-record as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationBody {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
}

/// User record as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(format = "uuid")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub is_approved_seller: bool,
    pub onboarding_completed: bool,
    pub application: ApplicationBody,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.to_string(),
            is_approved_seller: user.is_approved_seller,
            onboarding_completed: user.onboarding_completed,
            application: ApplicationBody {
                status: user.application.status.to_string(),
                reason: user.application.reason.clone(),
                category: user.application.category.clone(),
                applied_at: user.application.applied_at.map(|at| at.to_rfc3339()),
                reviewed_at: user.application.reviewed_at.map(|at| at.to_rfc3339()),
                review_note: user.application.review_note.clone(),
            },
        }
    }
}

/// Authenticate with an email/password pair and open a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequestBody,
    responses(
        (status = 200, description = "Logged in", body = UserBody),
        (status = 401, description = "Invalid credentials")
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequestBody>,
) -> ApiResult<web::Json<UserBody>> {
    let user_id = state
        .login
        .verify(&payload.email, &payload.password)
        .await
        .map_err(|error| Error::internal(error.to_string()))?
        .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|error| Error::internal(error.to_string()))?
        .ok_or_else(|| Error::internal("credential maps to a missing user"))?;

    session.persist_user(user.id)?;
    Ok(web::Json(UserBody::from(&user)))
}

/// Close the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Current authenticated user.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserBody),
        (status = 401, description = "Not logged in")
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserBody>> {
    let user = state.current_user(&session).await?;
    Ok(web::Json(UserBody::from(&user)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};
    use chrono::Utc;
    use serde_json::{json, Value};

    use super::*;
    use crate::domain::ports::{FixtureLoginService, UserRepository};
    use crate::domain::user::{User, UserId};
    use crate::inbound::http::test_utils::test_session_middleware;
    use crate::outbound::persistence::{
        MemoryListingRepository, MemoryLoginService, MemoryUserRepository,
    };

    fn app_with_state(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").service(login).service(logout).service(me))
    }

    #[actix_web::test]
    async fn login_rejects_unknown_credentials() {
        let state = HttpState::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryListingRepository::new()),
            Arc::new(FixtureLoginService),
        );
        let app = actix_test::init_service(app_with_state(state)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "kim@campus.edu", "password": "wrong" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn login_opens_a_session_usable_by_me() {
        let users = Arc::new(MemoryUserRepository::new());
        let login_service = Arc::new(MemoryLoginService::new());

        let kim = User::new(UserId::random(), "kim@campus.edu", "Kim", Utc::now());
        login_service
            .register("kim@campus.edu", "hunter2", kim.id)
            .expect("credential store reachable");
        users.insert(&kim).await.expect("insert succeeds");

        let state = HttpState::new(users, Arc::new(MemoryListingRepository::new()), login_service);
        let app = actix_test::init_service(app_with_state(state)).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "kim@campus.edu", "password": "hunter2" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie")
            .into_owned();

        let req = actix_test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(cookie)
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["email"], "kim@campus.edu");
        assert_eq!(body["role"], "customer");
    }

    #[actix_web::test]
    async fn me_without_session_is_unauthorized() {
        let state = HttpState::new(
            Arc::new(MemoryUserRepository::new()),
            Arc::new(MemoryListingRepository::new()),
            Arc::new(FixtureLoginService),
        );
        let app = actix_test::init_service(app_with_state(state)).await;

        let req = actix_test::TestRequest::get().uri("/api/v1/auth/me").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
