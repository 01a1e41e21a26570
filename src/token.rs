use std::{
    collections::HashSet,
    fmt,
    str::FromStr,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{ConstructionError, DecodeError, EncodeError},
    types::{Claims, Identity, RawClaims},
};

/// How long issued tokens stay valid unless configured otherwise.
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Signs identities into bearer tokens and turns tokens back into identities.
///
/// Holds no mutable state: a codec can be shared freely between threads.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime: Duration,
}

impl TokenCodec {
    /// Build a codec for the named HMAC algorithm (`HS256`, `HS384` or `HS512`).
    /// Any other name is rejected here rather than on first use, as is a
    /// lifetime whose expiry can't be written as nanoseconds since the epoch.
    pub fn new(
        secret: &[u8],
        algorithm: &str,
        issuer: impl Into<String>,
        lifetime: Duration,
    ) -> Result<Self, ConstructionError> {
        let algorithm = parse_algorithm(algorithm)?;

        if SystemTime::now()
            .checked_add(lifetime)
            .and_then(unix_nanos)
            .is_none()
        {
            return Err(ConstructionError::UnsupportedLifetime(lifetime));
        }

        let mut validation = Validation::new(algorithm);
        // `exp` is in nanoseconds, so the library's seconds-based check can't be used.
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer: issuer.into(),
            lifetime,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `identity`, expiring `lifetime` from now.
    ///
    /// Only a wholly absent identity is refused; an empty username is signed
    /// as-is.
    pub fn encode(&self, identity: Option<&Identity>) -> Result<String, EncodeError> {
        let identity = identity.ok_or(EncodeError::NilIdentity)?;

        let exp = SystemTime::now()
            .checked_add(self.lifetime)
            .and_then(unix_nanos)
            .ok_or(EncodeError::Clock)?;

        let claims = Claims {
            username: identity.username().to_owned(),
            email: identity.email().to_owned(),
            display_name: identity.display_name().to_owned(),
            iss: self.issuer.clone(),
            exp,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;

        debug!(username = identity.username(), "issued token");

        Ok(token)
    }

    /// Check the signature, then the expiry, then pull the identity out of the
    /// claims. The first failing step decides the error.
    pub fn decode(&self, token: &str) -> Result<Identity, DecodeError> {
        let claims = decode::<RawClaims>(token, &self.decoding_key, &self.validation)?.claims;

        let exp = claims
            .exp
            .as_ref()
            .and_then(Value::as_i64)
            .ok_or(DecodeError::MalformedClaim("exp"))?;

        let now = unix_nanos(SystemTime::now()).unwrap_or(i64::MAX);
        if now > exp {
            return Err(DecodeError::Expired);
        }

        let username = string_claim(claims.username, "username")?;
        let email = string_claim(claims.email, "email")?;
        let display_name = string_claim(claims.display_name, "display_name")?;

        Ok(Identity::new(username, email, display_name))
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

fn parse_algorithm(name: &str) -> Result<Algorithm, ConstructionError> {
    match Algorithm::from_str(name) {
        Ok(algorithm @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(algorithm),
        _ => Err(ConstructionError::UnsupportedAlgorithm(name.to_owned())),
    }
}

fn string_claim(value: Option<Value>, name: &'static str) -> Result<String, DecodeError> {
    match value {
        Some(Value::String(value)) => Ok(value),
        _ => Err(DecodeError::MalformedClaim(name)),
    }
}

fn unix_nanos(time: SystemTime) -> Option<i64> {
    let since_epoch = time.duration_since(UNIX_EPOCH).ok()?;
    i64::try_from(since_epoch.as_nanos()).ok()
}
