use crate::domain::user::driven_ports::{DetectUser, UserReader, UserWriter};
use crate::domain::user::driving_ports::{LogInError, SignUpError, UserPort};
use crate::routing_utils::{ApiErrorResponse, GenericErrorResponse, Json, ValidationErrorResponse};
use crate::token::TokenIssuer;
use crate::{AppState, SharedData, domain, dto};
use axum::Router;
use axum::extract::{FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{ErrorResponse, IntoResponse, Response};
use axum::routing::post;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, openapi};
use validator::Validate;

#[derive(OpenApi)]
#[openapi(
    paths(log_in, sign_up),
    components(schemas(dto::auth::LogIn, dto::auth::SignUp, dto::auth::AuthSuccess, dto::user::UserProfile)),
    modifiers(&BearerSecurity),
)]
/// Defines the OpenAPI documentation for the authentication API
pub struct AuthApi;
/// Constant used to group authentication endpoints in OpenAPI documentation
pub const AUTH_API_GROUP: &str = "Authentication";

/// Name of the security scheme every authenticated path refers to
pub const BEARER_SCHEME: &str = "bearer_token";

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// The id of the user a request's bearer token was issued to. Extracting it rejects the
/// request with a 401 if the token is missing, malformed, forged or expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i32);

#[axum::async_trait]
impl FromRequestParts<Arc<SharedData>> for AuthenticatedUser {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<SharedData>,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, &state.tokens)
    }
}

fn authenticate(parts: &Parts, tokens: &TokenIssuer) -> Result<AuthenticatedUser, ApiErrorResponse> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Err(ApiErrorResponse::unauthenticated("Authentication required."));
    };
    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            ApiErrorResponse::unauthenticated("The Authorization header must hold a Bearer token.")
        })?;

    let claims = tokens.verify(token.trim()).map_err(|err| {
        warn!("Rejected session token: {err}");
        ApiErrorResponse::unauthenticated(err.to_string())
    })?;

    Ok(AuthenticatedUser(claims.id))
}

/// Adds the login and signup routes, the only routes reachable without a token
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/auth/login",
            post(
                |State(app_state): AppState, Json(login): Json<dto::auth::LogIn>| async move {
                    let user_service = domain::user::UserService {};

                    log_in(login, &app_state.store, &app_state.tokens, &user_service).await
                },
            ),
        )
        .route(
            "/auth/signup",
            post(
                |State(app_state): AppState, Json(signup): Json<dto::auth::SignUp>| async move {
                    let user_service = domain::user::UserService {};

                    sign_up(signup, &app_state.store, &app_state.tokens, &user_service).await
                },
            ),
        )
}

/// Response type that turns user errors into [BasicErrorResponse][crate::routing_utils::BasicErrorResponse]s
pub enum UserErrorResponse {
    SignUp(SignUpError),
    LogIn(LogInError),
}

impl IntoResponse for UserErrorResponse {
    fn into_response(self) -> Response {
        match self {
            Self::SignUp(SignUpError::PortError(err)) | Self::LogIn(LogInError::PortError(err)) => {
                GenericErrorResponse(err).into_response()
            }
            Self::SignUp(conflict) => ApiErrorResponse::conflict(conflict.to_string()).into_response(),
            Self::LogIn(denied) => {
                ApiErrorResponse::unauthenticated(denied.to_string()).into_response()
            }
        }
    }
}

impl From<SignUpError> for UserErrorResponse {
    fn from(value: SignUpError) -> Self {
        Self::SignUp(value)
    }
}

impl From<LogInError> for UserErrorResponse {
    fn from(value: LogInError) -> Self {
        Self::LogIn(value)
    }
}

fn session_for(
    user: domain::user::User,
    tokens: &TokenIssuer,
    message: &str,
) -> Result<dto::auth::AuthSuccess, ErrorResponse> {
    let token = tokens.issue(&user).map_err(GenericErrorResponse)?;

    Ok(dto::auth::AuthSuccess {
        message: message.to_owned(),
        token,
        user: dto::user::UserProfile::from(user),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::LogIn,
    responses(
        (status = 200, description = "Logged in", body = dto::auth::AuthSuccess),
        (status = 400, description = "Malformed or invalid body", body = BasicErrorResponse),
        (status = 401, description = "Wrong email or password", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Exchanges an email and password for a session token
async fn log_in(
    login: dto::auth::LogIn,
    u_read: &impl UserReader,
    tokens: &TokenIssuer,
    user_service: &impl UserPort,
) -> Result<Json<dto::auth::AuthSuccess>, ErrorResponse> {
    info!("Login attempt");
    login.validate().map_err(ValidationErrorResponse::from)?;

    let user = user_service
        .log_in(&login.email, &login.password, u_read)
        .await
        .map_err(UserErrorResponse::from)?;
    info!(user_id = user.id, "Login succeeded");

    Ok(Json(session_for(user, tokens, "Login successful")?))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = AUTH_API_GROUP,
    request_body = dto::auth::SignUp,
    responses(
        (status = 201, description = "Account created and logged in", body = dto::auth::AuthSuccess),
        (status = 400, description = "Malformed or invalid body", body = BasicErrorResponse),
        (status = 409, description = "Email or username already taken", body = BasicErrorResponse),
        (status = 500, description = "Unexpected failure", body = BasicErrorResponse),
    ),
)]
/// Registers a new account and logs it in
async fn sign_up(
    signup: dto::auth::SignUp,
    store: &(impl DetectUser + UserWriter),
    tokens: &TokenIssuer,
    user_service: &impl UserPort,
) -> Result<(StatusCode, Json<dto::auth::AuthSuccess>), ErrorResponse> {
    info!("Signup attempt: {}", signup);
    signup.validate().map_err(ValidationErrorResponse::from)?;

    let new_user = domain::user::NewUser::from(signup);
    let user = user_service
        .sign_up(&new_user, store, store)
        .await
        .map_err(UserErrorResponse::from)?;

    Ok((
        StatusCode::CREATED,
        Json(session_for(user, tokens, "User created successfully")?),
    ))
}
