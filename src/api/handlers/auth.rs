//! HTTP handlers for the authentication endpoints.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::cookie::Cookie;
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::middleware::AuthenticatedUser;
use crate::auth::session::{removal_cookie, session_cookie};
use crate::auth::validation::{
    LoginRequest, RegisterRequest, ResendVerificationRequest, VerifyEmailRequest,
};
use crate::auth::LoginOutcome;

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new<S: Into<String>>(message: S) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginSuccessBody {
    pub user: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub authenticated: bool,
    pub user: String,
}

/// Response wrapper that attaches a Set-Cookie header to a JSON body.
pub struct WithCookie<T> {
    status: StatusCode,
    body: T,
    cookie: Cookie<'static>,
}

impl<T: Serialize> IntoResponse for WithCookie<T> {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.body)).into_response();
        if let Ok(cookie_value) = self.cookie.to_string().parse() {
            response.headers_mut().insert(header::SET_COOKIE, cookie_value);
        }
        response
    }
}

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = MessageResponse),
        (status = 401, description = "Malformed email address"),
        (status = 409, description = "Email or username already registered")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    payload.validate().map_err(crate::errors::Error::from)?;

    let outcome = state.registration.register(&payload).await?;

    let message = if outcome.notified {
        "User registered! Check your email to verify your account."
    } else {
        "User registered! We could not send the verification email; request a resend."
    };

    Ok((StatusCode::CREATED, Json(MessageResponse::new(message))))
}

#[utoipa::path(
    post,
    path = "/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = MessageResponse),
        (status = 404, description = "Unknown or already used token")
    ),
    tag = "auth"
)]
pub async fn verify_email_handler(
    State(state): State<ApiState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.registration.verify_email(&payload.token).await?;
    Ok(Json(MessageResponse::new("Email verified successfully!")))
}

#[utoipa::path(
    post,
    path = "/resend-verification",
    request_body = ResendVerificationRequest,
    responses(
        (status = 200, description = "Verification email sent if the account is pending", body = MessageResponse),
        (status = 500, description = "Email delivery failed")
    ),
    tag = "auth"
)]
pub async fn resend_verification_handler(
    State(state): State<ApiState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.validate().map_err(crate::errors::Error::from)?;

    state.registration.resend_verification(&payload.email).await?;
    Ok(Json(MessageResponse::new("Check your email to verify your account.")))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login successful", body = LoginSuccessBody,
         headers(("Set-Cookie" = String, description = "Session cookie (taskease_token)"))),
        (status = 202, description = "Account pending email verification", body = MessageResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    payload.validate().map_err(crate::errors::Error::from)?;

    match state.login.login(&payload).await? {
        LoginOutcome::Success { user, session_token } => Ok(WithCookie {
            status: StatusCode::CREATED,
            body: LoginSuccessBody {
                user: user.username,
                message: "Login Successful".to_string(),
            },
            cookie: session_cookie(session_token),
        }
        .into_response()),
        LoginOutcome::PendingVerification => Ok((
            StatusCode::ACCEPTED,
            Json(MessageResponse::new("Check your email to verify your account.")),
        )
            .into_response()),
    }
}

#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Authenticated user details", body = MeResponse),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<ApiState>,
    Extension(current): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>, ApiError> {
    // The gate only proves the cookie; re-resolve the identity so a purged
    // account cannot keep using a still-valid credential.
    let user = state
        .users
        .get_user_by_email(&current.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized: missing or invalid session"))?;

    Ok(Json(MeResponse { authenticated: true, user: user.username }))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout_handler() -> WithCookie<MessageResponse> {
    // Stateless sessions: logout clears the client cookie; the credential
    // itself stays valid until its natural expiry.
    WithCookie {
        status: StatusCode::OK,
        body: MessageResponse::new("Logged out"),
        cookie: removal_cookie(),
    }
}
