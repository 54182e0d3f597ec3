use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;

use crate::SecretString;

/// Generates a random key of `length` alphanumeric characters.
///
/// Characters come from the operating system RNG, about 5.95 bits of
/// entropy each, so a 32 character key carries roughly 190 bits.
///
/// # Example
///
/// ```rust
/// use sealed_session::crypto::generate_key;
///
/// let key = generate_key(64);
/// assert_eq!(key.len(), 64);
/// ```
pub fn generate_key(length: usize) -> SecretString {
    let key: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect();
    SecretString::new(key)
}
