use rand::Rng;

use crate::constants::{ASSET_ID_PREFIX, ASSET_ID_SUFFIX_LEN};

const BASE36_UPPER: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE36_LOWER: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Mint a new asset identifier, e.g. `PBA-ASSET-7K2M9QX0A`.
pub fn mint_asset_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{ASSET_ID_PREFIX}{}", random_base36(rng, ASSET_ID_SUFFIX_LEN, BASE36_UPPER))
}

/// Short lower-case id for allies.
pub fn short_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_base36(rng, 9, BASE36_LOWER)
}

fn random_base36<R: Rng + ?Sized>(rng: &mut R, len: usize, alphabet: &[u8; 36]) -> String {
    (0..len)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())] as char)
        .collect()
}

pub fn is_asset_id(s: &str) -> bool {
    s.strip_prefix(ASSET_ID_PREFIX).is_some_and(|rest| {
        rest.len() == ASSET_ID_SUFFIX_LEN
            && rest
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
    })
}
