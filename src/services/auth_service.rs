use sha2::{Digest, Sha256};

/// Pluggable credential check guarding the posting endpoint. Implementations
/// must not leak information about partial matches through timing.
pub trait CredentialVerifier: Send + Sync + std::fmt::Debug {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Verifies against a fixed username/password pair from configuration.
///
/// Both sides of the comparison are reduced to SHA-256 digests, and digests
/// are compared with a full-width byte fold. The work done is independent of
/// where (or whether) a candidate diverges, so neither credential length nor
/// matching prefixes are observable through timing.
#[derive(Clone)]
pub struct StaticCredentials {
    username_digest: [u8; 32],
    password_digest: [u8; 32],
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials").finish_non_exhaustive()
    }
}

impl StaticCredentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self { username_digest: digest(username), password_digest: digest(password) }
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let username_ok = digests_match(&digest(username), &self.username_digest);
        let password_ok = digests_match(&digest(password), &self.password_digest);
        // Non-short-circuiting: both digests are always checked.
        username_ok & password_ok
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
