use crate::{
    auth::{AuthService, AuthenticatedUser, LoginRequest, RefreshRequest, RegisterRequest},
    error::AppError,
};
use actix_web::cookie::{Cookie, SameSite};
use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

/// Cookie under which the refresh token is mirrored for browser clients.
/// HttpOnly keeps it out of script reach; the JSON body carries the same
/// value for non-browser callers.
pub const REFRESH_COOKIE: &str = "refresh_token";

fn refresh_cookie(token: &str) -> Cookie<'_> {
    Cookie::build(REFRESH_COOKIE, token)
        .path("/api/auth")
        .http_only(true)
        .same_site(SameSite::Strict)
        .finish()
}

fn clear_refresh_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(REFRESH_COOKIE, "")
        .path("/api/auth")
        .http_only(true)
        .same_site(SameSite::Strict)
        .finish();
    cookie.make_removal();
    cookie
}

/// The refresh token may arrive in the JSON body or, for browser clients,
/// in the HttpOnly cookie set at login.
fn presented_refresh_token(
    req: &HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
) -> Result<String, AppError> {
    if let Some(body) = body {
        body.validate()?;
        return Ok(body.into_inner().refresh_token);
    }
    req.cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or_else(|| AppError::BadRequest("Refresh token is required".into()))
}

/// Register a new user
///
/// Creates the account and returns the public user record. No session is
/// opened; the client logs in afterwards.
#[post("/register")]
pub async fn register(
    service: web::Data<AuthService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = service
        .register(
            &register_data.name,
            &register_data.email,
            &register_data.password,
        )
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Verifies credentials and opens a session. The response body carries the
/// user, the access token and the refresh token; the refresh token is also
/// set as an HttpOnly cookie.
#[post("/login")]
pub async fn login(
    service: web::Data<AuthService>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let session = service.login(&login_data.email, &login_data.password).await?;

    let cookie = refresh_cookie(&session.refresh_token).into_owned();
    Ok(HttpResponse::Ok().cookie(cookie).json(session))
}

/// Refresh the session
///
/// Exchanges a valid refresh token for a new access token, rotating the
/// refresh token. The presented token is revoked; clients must replace their
/// stored copy with the returned one.
#[post("/refresh")]
pub async fn refresh(
    req: HttpRequest,
    service: web::Data<AuthService>,
    refresh_data: Option<web::Json<RefreshRequest>>,
) -> Result<impl Responder, AppError> {
    let refresh_token = presented_refresh_token(&req, refresh_data)?;

    let pair = service.refresh_access_token(&refresh_token).await?;

    let cookie = refresh_cookie(&pair.refresh_token).into_owned();
    Ok(HttpResponse::Ok().cookie(cookie).json(pair))
}

/// Logout
///
/// Revokes the presented refresh token, provided it belongs to the
/// authenticated caller, and clears the refresh cookie. Requires a valid
/// access token.
#[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    service: web::Data<AuthService>,
    user: AuthenticatedUser,
    refresh_data: Option<web::Json<RefreshRequest>>,
) -> Result<impl Responder, AppError> {
    let refresh_token = presented_refresh_token(&req, refresh_data)?;

    service
        .revoke_user_refresh_token(user.id, &refresh_token)
        .await?;

    Ok(HttpResponse::Ok()
        .cookie(clear_refresh_cookie())
        .json(serde_json::json!({ "message": "Logged out successfully" })))
}
