use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use warp::{
    filters::{body::BodyDeserializeError, BoxedFilter},
    hyper::StatusCode,
    path, Filter, Rejection, Reply,
};

use crate::{
    auth::AuthenticationController, error::AuthError, store::CredentialStore, types::Identity,
};

/// Routes for issuing, verifying and invalidating tokens, mounted under
/// `base_url`:
///
/// - `POST {base_url}/token` with `{"username", "password"}`
/// - `GET {base_url}/verify/{token}`
/// - `DELETE {base_url}/token/{token}`
pub fn build_api_route_filter<S: CredentialStore>(
    auth: &AuthenticationController<S>,
    base_url: &str,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let prefix = base_path(base_url);

    let token = prefix
        .clone()
        .and(path!("token"))
        .and(warp::post())
        .and(warp::body::json::<AuthenticateRequest>())
        .and(with_controller(auth.clone()))
        .and_then(token_handler::<S>);

    let verify = prefix
        .clone()
        .and(path!("verify" / String))
        .and(warp::get())
        .and(with_controller(auth.clone()))
        .and_then(verify_handler::<S>);

    let invalidate = prefix
        .and(path!("token" / String))
        .and(warp::delete())
        .and(with_controller(auth.clone()))
        .map(invalidate_handler::<S>);

    token.or(verify).or(invalidate)
}

/// Requires an `Authorization: Bearer <token>` header and extracts the
/// identity the token was issued for.
pub fn with_auth<S: CredentialStore>(
    auth: &AuthenticationController<S>,
) -> impl Filter<Extract = (Identity,), Error = Rejection> + Clone {
    warp::header::<String>("authorization")
        .and(with_controller(auth.clone()))
        .and_then(user_auth_check::<S>)
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: &'static str,
}

pub async fn handle_auth_errors(err: Rejection) -> Result<impl Reply, Rejection> {
    let (status, code, message) = if let Some(auth_error) = err.find::<AuthError>() {
        match auth_error {
            AuthError::BadCredentials => (
                StatusCode::BAD_REQUEST,
                "bad_input_data",
                "user or password do not match",
            ),
            AuthError::InvalidToken { .. } => (StatusCode::BAD_REQUEST, "invalid_token", ""),
            AuthError::TokenIssuanceFailed { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "an unknown error has occurred",
            ),
        }
    } else if err.find::<BodyDeserializeError>().is_some() {
        (StatusCode::BAD_REQUEST, "bad_input_data", "")
    } else {
        return Err(err);
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorResponse { code, message }),
        status,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AuthenticateRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthenticateResponse {
    pub access_token: String,
}

async fn token_handler<S: CredentialStore>(
    input: AuthenticateRequest,
    auth: AuthenticationController<S>,
) -> Result<impl Reply, Rejection> {
    let access_token = auth.authenticate(&input.username, &input.password).await?;

    Ok(warp::reply::json(&AuthenticateResponse { access_token }))
}

async fn verify_handler<S: CredentialStore>(
    token: String,
    auth: AuthenticationController<S>,
) -> Result<impl Reply, Rejection> {
    let identity = auth.verify(&token)?;

    Ok(warp::reply::json(&identity))
}

fn invalidate_handler<S: CredentialStore>(
    token: String,
    auth: AuthenticationController<S>,
) -> impl Reply {
    auth.invalidate(&token);
    StatusCode::NO_CONTENT
}

// Unwrap the bearer token and validate it
async fn user_auth_check<S: CredentialStore>(
    header: String,
    auth: AuthenticationController<S>,
) -> Result<Identity, Rejection> {
    let token = bearer_token(&header).ok_or(AuthError::InvalidToken { source: None })?;

    Ok(auth.verify(token)?)
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim_start())
    } else {
        None
    }
}

fn base_path(base_url: &str) -> BoxedFilter<()> {
    base_url
        .split('/')
        .filter(|segment| !segment.is_empty())
        .fold(warp::any().boxed(), |prefix, segment| {
            prefix.and(warp::path(segment.to_owned())).boxed()
        })
}

// functor that adds a handle to the controller into the filter chain
fn with_controller<S: CredentialStore>(
    auth: AuthenticationController<S>,
) -> impl Filter<Extract = (AuthenticationController<S>,), Error = Infallible> + Clone {
    warp::any().map(move || auth.clone())
}
