//! Client identity (User-Agent) selection.
//!
//! A session picks one identity when it is created and keeps it for its whole
//! lifetime. The random source is a parameter so tests can seed it.

use rand::Rng;

/// Chrome major version the identity strings advertise.
/// Updated to Chrome 131 (November 2024)
pub const IDENTITY_CHROME_VERSION: &str = "131.0.0.0";

/// Pool of realistic desktop browser identities.
pub const IDENTITY_POOL: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
];

/// Picks one identity uniformly from [`IDENTITY_POOL`].
pub fn pick_identity<R: Rng>(rng: &mut R) -> &'static str {
    IDENTITY_POOL[rng.random_range(0..IDENTITY_POOL.len())]
}
