//! Storage identifier generation.
//!
//! Storage keys must be collision-resistant and unpredictable: a guessable
//! key would allow asset enumeration or overwrite. Identifiers are 32 bytes
//! from a CSPRNG, encoded base64url without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Entropy per identifier, in bytes.
pub const ASSET_ID_BYTES: usize = 32;

/// Generate a fresh storage identifier.
///
/// `rand::rng()` is an OS-seeded CSPRNG, so identifiers are suitable for
/// unguessable public URLs. Never reused across assets.
pub fn random_asset_id() -> String {
    let mut bytes = [0u8; ASSET_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
