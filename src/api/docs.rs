//! OpenAPI documentation for the authentication endpoints.

use utoipa::OpenApi;

use crate::api::handlers::auth;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::verify_email_handler,
        auth::resend_verification_handler,
        auth::login_handler,
        auth::me_handler,
        auth::logout_handler,
    ),
    tags(
        (name = "auth", description = "Registration, verification, and session lifecycle")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_all_auth_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/register", "/verify-email", "/resend-verification", "/login", "/me", "/logout"]
        {
            assert!(doc.paths.paths.contains_key(path), "missing path: {}", path);
        }
    }
}
