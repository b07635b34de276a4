//! RustCrypto + dalek backend
//!
//! | Case | Crate | Inputs |
//! |------|-------|--------|
//! | Chacha20 | `chacha20` (DJB variant) | in SIZE, key 32, nonce 8 |
//! | Poly1305 | `poly1305` | in SIZE, key 32 |
//! | Auth'd encryption | `chacha20poly1305` (XChaCha20) | in SIZE, key 32, nonce 24 |
//! | BLAKE2b | `blake2` keyed, 64-byte digest | in SIZE, key 32 |
//! | SHA-512 | `sha2` | in SIZE |
//! | Argon2i, 3 passes | `argon2` | password 16, salt 16, SIZE work area |
//! | x25519 | `x25519-dalek` ladder | scalar 32, peer point 32 |
//! | EdDSA(sign) / EdDSA(check) | `ed25519-dalek` | secret 32, message 64 |
//! | x25519 inverse | `curve25519-dalek` inverted scalar times a point | chained from {9} |
//! | x25519 dirty fast | `curve25519-dalek` Edwards fixed-base table | scalar 32 |
//! | x25519 dirty small | `curve25519-dalek` Montgomery ladder from the base point | scalar 32 |
//!
//! Stateless one-shot APIs are rebuilt from the key inside the loop, the way a
//! caller without a cached context would use them. Fallible calls go through
//! `measure_checked`, so an error counts as a failed iteration.
//!
//! The Curve25519 rows chain their output into the next call, like the
//! exchange they stand for.

use std::hint::black_box;

use speed_core::prelude::*;

/// Argon2 block size in bytes
const ARGON2_BLOCK: usize = 1024;

/// Signed message length
const MESSAGE: usize = 64;

/// u-coordinate of the Curve25519 base point
const BASE_U: [u8; 32] = {
    let mut u = [0u8; 32];
    u[0] = 9;
    u
};

pub const CASES: &[BenchCase] = &[
    BenchCase::throughput("Chacha20", SIZE, chacha20),
    BenchCase::throughput("Poly1305", SIZE, poly1305),
    BenchCase::throughput("Auth'd encryption", SIZE, authenticated),
    BenchCase::throughput("BLAKE2b", SIZE, blake2b),
    BenchCase::throughput("SHA-512", SIZE, sha512),
    BenchCase::throughput("Argon2i, 3 passes", SIZE, argon2i),
    BenchCase::rate("x25519", Unit::Exchanges, x25519),
    BenchCase::rate("EdDSA(sign)", Unit::Signatures, ed25519_sign),
    BenchCase::rate("EdDSA(check)", Unit::Checks, ed25519_check),
    BenchCase::rate("x25519 inverse", Unit::ScalarInv, x25519_inverse),
    BenchCase::rate("x25519 dirty fast", Unit::ScalarInv, x25519_dirty_fast),
    BenchCase::rate("x25519 dirty small", Unit::ScalarInv, x25519_dirty_small),
];

fn chacha20(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use chacha20::cipher::{KeyIvInit, StreamCipher};
    use chacha20::{ChaCha20Legacy, Key, LegacyNonce};

    let input = ctx.random_input("plaintext", SIZE)?;
    let key: [u8; 32] = ctx.random_array("key")?;
    let nonce: [u8; 8] = ctx.random_array("nonce")?;
    let mut out = ctx.output("ciphertext", SIZE)?;

    ctx.measure_checked(|| {
        let mut cipher = ChaCha20Legacy::new(Key::from_slice(&key), LegacyNonce::from_slice(&nonce));
        cipher.apply_keystream_b2b(&input, &mut out).is_ok()
    })
}

fn poly1305(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use poly1305::universal_hash::KeyInit;
    use poly1305::{Key, Poly1305};

    let input = ctx.random_input("message", SIZE)?;
    let key: [u8; 32] = ctx.random_array("key")?;
    let mut tag = [0u8; 16];

    ctx.measure(|| {
        let mac = Poly1305::new(Key::from_slice(&key)).compute_unpadded(&input);
        tag.copy_from_slice(&mac);
    })
}

fn authenticated(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use chacha20poly1305::aead::{AeadInPlace, KeyInit};
    use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};

    // encrypted in place; each pass re-encrypts the previous ciphertext
    let mut buf = ctx.random_input("plaintext", SIZE)?;
    let key: [u8; 32] = ctx.random_array("key")?;
    let nonce: [u8; 24] = ctx.random_array("nonce")?;
    let mut mac = [0u8; 16];

    ctx.measure_checked(|| {
        let aead = XChaCha20Poly1305::new(Key::from_slice(&key));
        match aead.encrypt_in_place_detached(XNonce::from_slice(&nonce), b"", &mut buf) {
            Ok(tag) => {
                mac.copy_from_slice(&tag);
                true
            }
            Err(_) => false,
        }
    })
}

fn blake2b(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use blake2::digest::Mac;
    use blake2::Blake2bMac512;

    let input = ctx.random_input("message", SIZE)?;
    let key: [u8; 32] = ctx.random_array("key")?;
    let mut hash = [0u8; 64];

    Blake2bMac512::new_with_salt_and_personal(&key, &[], &[]).map_err(|e| ctx.setup_error(e))?;

    ctx.measure_checked(|| match Blake2bMac512::new_with_salt_and_personal(&key, &[], &[]) {
        Ok(mut hasher) => {
            hasher.update(&input);
            hash.copy_from_slice(&hasher.finalize().into_bytes());
            true
        }
        Err(_) => false,
    })
}

fn sha512(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use sha2::{Digest, Sha512};

    let input = ctx.random_input("message", SIZE)?;
    let mut hash = [0u8; 64];

    ctx.measure(|| {
        hash.copy_from_slice(&Sha512::digest(&input));
    })
}

fn argon2i(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use argon2::{Algorithm, Argon2, Block, Params, Version};

    let blocks = SIZE / ARGON2_BLOCK;
    let password: [u8; 16] = ctx.random_array("password")?;
    let salt: [u8; 16] = ctx.random_array("salt")?;
    let mut hash = [0u8; 32];

    let params = Params::new(blocks as u32, 3, 1, Some(hash.len())).map_err(|e| ctx.setup_error(e))?;
    let argon2 = Argon2::new(Algorithm::Argon2i, Version::V0x13, params);

    let mut work_area: Vec<Block> = Vec::new();
    work_area
        .try_reserve_exact(blocks)
        .map_err(|_| BenchError::Allocation {
            role: "work area",
            size: SIZE,
        })?;
    work_area.resize(blocks, Block::default());

    // reject bad parameters before the timed region
    argon2
        .hash_password_into_with_memory(&password, &salt, &mut hash, &mut work_area)
        .map_err(|e| ctx.setup_error(e))?;

    ctx.measure_checked(|| {
        argon2
            .hash_password_into_with_memory(&password, &salt, &mut hash, &mut work_area)
            .is_ok()
    })
}

fn x25519(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use x25519_dalek::{PublicKey, StaticSecret};

    let scalar: [u8; 32] = ctx.random_array("scalar")?;
    let peer_secret: [u8; 32] = ctx.random_array("peer scalar")?;
    let peer = PublicKey::from(&StaticSecret::from(peer_secret)).to_bytes();
    let mut shared = [0u8; 32];

    ctx.measure(|| {
        shared = x25519_dalek::x25519(black_box(scalar), black_box(peer));
    })
}

fn ed25519_sign(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use ed25519_dalek::{Signer, SigningKey};

    let secret: [u8; 32] = ctx.random_array("secret key")?;
    let message = ctx.random_input("message", MESSAGE)?;
    let signing_key = SigningKey::from_bytes(&secret);
    let mut signature = [0u8; 64];

    ctx.measure(|| {
        signature = signing_key.sign(&message).to_bytes();
    })
}

fn ed25519_check(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use ed25519_dalek::{Signer, SigningKey, Verifier};

    let secret: [u8; 32] = ctx.random_array("secret key")?;
    let message = ctx.random_input("message", MESSAGE)?;
    let signing_key = SigningKey::from_bytes(&secret);
    let verifying_key = signing_key.verifying_key();
    let signature = signing_key.sign(&message);

    ctx.measure_checked(|| verifying_key.verify(&message, &signature).is_ok())
}

fn x25519_inverse(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use curve25519_dalek::scalar::{clamp_integer, Scalar};
    use curve25519_dalek::MontgomeryPoint;

    let point = MontgomeryPoint(BASE_U);
    let mut out = BASE_U;

    ctx.measure(|| {
        let inverse = Scalar::from_bytes_mod_order(clamp_integer(out)).invert();
        out = (&point * &inverse).to_bytes();
    })
}

fn x25519_dirty_fast(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use curve25519_dalek::EdwardsPoint;

    let mut sk: [u8; 32] = ctx.random_array("scalar")?;

    ctx.measure(|| {
        sk = EdwardsPoint::mul_base_clamped(sk).to_montgomery().to_bytes();
    })
}

fn x25519_dirty_small(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    use curve25519_dalek::constants::X25519_BASEPOINT;

    let mut sk: [u8; 32] = ctx.random_array("scalar")?;

    ctx.measure(|| {
        sk = X25519_BASEPOINT.mul_clamped(sk).to_bytes();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_names_are_unique() {
        let mut names: Vec<&str> = CASES.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CASES.len());
    }

    #[test]
    fn test_bulk_cases_process_size_bytes() {
        for case in CASES.iter().filter(|c| c.unit == Unit::Megabytes) {
            assert_eq!(case.bytes_per_iteration, SIZE as u64, "{}", case.name);
        }
    }

    #[test]
    fn test_argon2_work_area_matches_size() {
        assert_eq!(SIZE / ARGON2_BLOCK, 256);
    }

    #[test]
    fn test_base_point_matches_dalek() {
        assert_eq!(BASE_U, curve25519_dalek::constants::X25519_BASEPOINT.to_bytes());
    }

    #[test]
    fn test_dirty_paths_agree() {
        use curve25519_dalek::constants::X25519_BASEPOINT;
        use curve25519_dalek::EdwardsPoint;

        let sk = [0x42u8; 32];
        let fast = EdwardsPoint::mul_base_clamped(sk).to_montgomery();
        let small = X25519_BASEPOINT.mul_clamped(sk);
        assert_eq!(fast, small);
        assert_eq!(small.to_bytes(), x25519_dalek::x25519(sk, BASE_U));
    }

    #[test]
    fn test_curve_rows_use_scalar_unit() {
        let curve: Vec<&str> = CASES
            .iter()
            .filter(|c| c.unit == Unit::ScalarInv)
            .map(|c| c.name)
            .collect();
        assert_eq!(curve, ["x25519 inverse", "x25519 dirty fast", "x25519 dirty small"]);

        // only a real key exchange is counted in exchanges
        let exchanges: Vec<&str> = CASES
            .iter()
            .filter(|c| c.unit == Unit::Exchanges)
            .map(|c| c.name)
            .collect();
        assert_eq!(exchanges, ["x25519"]);
    }

    #[test]
    fn test_chacha20_uses_djb_nonce() {
        assert_eq!(chacha20::LegacyNonce::default().len(), 8);
    }
}
