use warp::reject::Reject;

/// Misconfiguration detected while building a codec, store or controller.
/// Fatal at startup.
#[derive(thiserror::Error, Debug)]
pub enum ConstructionError {
    #[error("unsupported signing algorithm `{0}`")]
    UnsupportedAlgorithm(String),
    #[error("token lifetime {0:?} puts the expiry out of range")]
    UnsupportedLifetime(std::time::Duration),
    #[error("unsupported database driver `{0}`")]
    UnsupportedDriver(String),
    #[error("invalid password scheme configuration")]
    PasswordScheme {
        #[from]
        source: argon2::Error,
    },
    #[error("error opening credential database")]
    Database {
        #[from]
        source: rusqlite::Error,
    },
    #[error("error reading configuration")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("error parsing configuration")]
    Config {
        #[from]
        source: serde_json::Error,
    },
}

/// No credential record matches the supplied pair. Deliberately says nothing
/// about which half of the pair was wrong.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no matching credentials")]
pub struct NotFoundError;

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("cannot issue a token without an identity")]
    NilIdentity,
    #[error("token expiry is not representable")]
    Clock,
    #[error("error signing token")]
    Signing {
        #[from]
        source: jsonwebtoken::errors::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("token is malformed or its signature does not match")]
    InvalidSignature {
        #[from]
        source: jsonwebtoken::errors::Error,
    },
    #[error("token has expired")]
    Expired,
    #[error("token claim `{0}` is missing or is not of the expected type")]
    MalformedClaim(&'static str),
}

/// The only errors callers of the controller ever see.
///
/// The display text of `BadCredentials` and `InvalidToken` is generic; the
/// underlying reason is reachable through `source()` for diagnostics only.
#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("username or password incorrect")]
    BadCredentials,
    #[error("invalid token")]
    InvalidToken {
        #[source]
        source: Option<DecodeError>,
    },
    #[error("error issuing token")]
    TokenIssuanceFailed {
        #[from]
        source: EncodeError,
    },
}

impl From<NotFoundError> for AuthError {
    fn from(_: NotFoundError) -> Self {
        AuthError::BadCredentials
    }
}

impl From<DecodeError> for AuthError {
    fn from(err: DecodeError) -> Self {
        AuthError::InvalidToken { source: Some(err) }
    }
}

impl Reject for AuthError {}
