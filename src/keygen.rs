//! License key generation.
//!
//! Keys are 16 characters of uppercase letters and digits, grouped with a
//! hyphen every 4 characters (`XXXX-XXXX-XXXX-XXXX`). Generation does not
//! check uniqueness; the UNIQUE constraint on `licenses.license_key` catches
//! the rare collision and the caller regenerates.

use rand::Rng;

const KEY_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GROUPS: usize = 4;
const GROUP_LEN: usize = 4;

/// Generate a random license key in `XXXX-XXXX-XXXX-XXXX` format.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    let mut key = String::with_capacity(GROUPS * GROUP_LEN + GROUPS - 1);

    for group in 0..GROUPS {
        if group > 0 {
            key.push('-');
        }
        for _ in 0..GROUP_LEN {
            key.push(KEY_CHARS[rng.gen_range(0..KEY_CHARS.len())] as char);
        }
    }

    key
}
