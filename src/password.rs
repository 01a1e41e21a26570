use serde::Deserialize;

use crate::error::ConstructionError;

/// How a supplied password is turned into the value stored alongside a user.
///
/// Stores compare the encoded form for exact equality, so the encoding has to
/// be deterministic. `Plaintext` stores and compares the password verbatim,
/// which is the default. `Argon2` hashes with a fixed, configured salt: if the
/// salt changes, no previously stored password matches any more.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "scheme", rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Plaintext,
    Argon2 {
        salt: String,
    },
}

impl PasswordScheme {
    pub fn encode(&self, password: &str) -> Result<String, argon2::Error> {
        match self {
            PasswordScheme::Plaintext => Ok(password.to_owned()),
            PasswordScheme::Argon2 { salt } => argon2::hash_encoded(
                password.as_bytes(),
                salt.as_bytes(),
                &Default::default(),
            ),
        }
    }

    /// Fails if the scheme can't encode anything at all, e.g. an argon2 salt
    /// shorter than 8 bytes.
    pub(crate) fn check(&self) -> Result<(), ConstructionError> {
        self.encode("")?;
        Ok(())
    }
}
