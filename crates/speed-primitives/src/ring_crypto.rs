//! ring backend
//!
//! ring keeps keys in prepared contexts (`hmac::Key`, `LessSafeKey`,
//! `Ed25519KeyPair`), so key schedules are built once during setup. It has
//! no public raw stream cipher or one-time MAC; HMAC-SHA512 stands in as
//! the MAC row.
//!
//! X25519 private keys are single-use in ring. Each timed exchange draws a
//! fresh ephemeral key from `SystemRandom` and runs `agree_ephemeral`; the
//! cost of drawing the key is measured on its own and subtracted, so the
//! reported rate covers the agreement only.

use ring::agreement::{self, EphemeralPrivateKey, UnparsedPublicKey, X25519};
use ring::rand::SystemRandom;
use ring::signature::{self, Ed25519KeyPair, KeyPair};
use ring::{aead, digest, hmac};

use speed_core::prelude::*;
use tracing::debug;

/// Signed message length
const MESSAGE: usize = 64;

pub const CASES: &[BenchCase] = &[
    BenchCase::throughput("HMAC-SHA512", SIZE, hmac_sha512),
    BenchCase::throughput("Auth'd encryption", SIZE, authenticated),
    BenchCase::throughput("SHA-512", SIZE, sha512),
    BenchCase::rate("x25519", Unit::Exchanges, x25519),
    BenchCase::rate("EdDSA(sign)", Unit::Signatures, ed25519_sign),
    BenchCase::rate("EdDSA(check)", Unit::Checks, ed25519_check),
];

fn hmac_sha512(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    let input = ctx.random_input("message", SIZE)?;
    let key_bytes: [u8; 32] = ctx.random_array("key")?;
    let key = hmac::Key::new(hmac::HMAC_SHA512, &key_bytes);
    let mut tag = [0u8; 64];

    ctx.measure(|| {
        tag.copy_from_slice(hmac::sign(&key, &input).as_ref());
    })
}

fn authenticated(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    let mut buf = ctx.random_input("plaintext", SIZE)?;
    let key_bytes: [u8; 32] = ctx.random_array("key")?;
    let nonce: [u8; aead::NONCE_LEN] = ctx.random_array("nonce")?;
    let unbound = aead::UnboundKey::new(&aead::CHACHA20_POLY1305, &key_bytes).map_err(|e| ctx.setup_error(e))?;
    let key = aead::LessSafeKey::new(unbound);
    let mut mac = [0u8; 16];

    // nonce reuse is fine here: the ciphertext is discarded
    ctx.measure_checked(|| {
        let nonce = aead::Nonce::assume_unique_for_key(nonce);
        match key.seal_in_place_separate_tag(nonce, aead::Aad::empty(), &mut buf) {
            Ok(tag) => {
                mac.copy_from_slice(tag.as_ref());
                true
            }
            Err(_) => false,
        }
    })
}

fn sha512(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    let input = ctx.random_input("message", SIZE)?;
    let mut hash = [0u8; 64];

    ctx.measure(|| {
        hash.copy_from_slice(digest::digest(&digest::SHA512, &input).as_ref());
    })
}

fn x25519(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    let rng = SystemRandom::new();
    let peer_private = EphemeralPrivateKey::generate(&X25519, &rng).map_err(|e| ctx.setup_error(e))?;
    let peer_public = peer_private.compute_public_key().map_err(|e| ctx.setup_error(e))?;
    let peer = UnparsedPublicKey::new(&X25519, peer_public.as_ref().to_vec());
    let mut shared = [0u8; 32];

    // one exchange outside the timed region, so a broken RNG or peer key
    // surfaces as a setup error
    let private = EphemeralPrivateKey::generate(&X25519, &rng).map_err(|e| ctx.setup_error(e))?;
    agreement::agree_ephemeral(private, &peer, |material| shared.copy_from_slice(material))
        .map_err(|e| ctx.setup_error(e))?;

    let exchange = ctx.measure_checked(|| match EphemeralPrivateKey::generate(&X25519, &rng) {
        Ok(private) => {
            agreement::agree_ephemeral(private, &peer, |material| shared.copy_from_slice(material)).is_ok()
        }
        Err(_) => false,
    })?;
    let keygen = ctx.measure_checked(|| EphemeralPrivateKey::generate(&X25519, &rng).is_ok())?;
    debug!(
        case = ctx.name(),
        keygen_ns = keygen.elapsed.as_nanos() as f64 / keygen.iterations as f64,
        "subtracting ephemeral key generation"
    );

    exchange.net_of(&keygen).ok_or_else(|| BenchError::ZeroDuration {
        case: ctx.name().to_string(),
        iterations: exchange.iterations,
    })
}

fn ed25519_key_pair(ctx: &mut CaseContext<'_>) -> Result<Ed25519KeyPair> {
    let seed: [u8; 32] = ctx.random_array("secret key")?;
    Ed25519KeyPair::from_seed_unchecked(&seed).map_err(|e| ctx.setup_error(e))
}

fn ed25519_sign(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    let key_pair = ed25519_key_pair(ctx)?;
    let message = ctx.random_input("message", MESSAGE)?;
    let mut sig = [0u8; 64];

    ctx.measure(|| {
        sig.copy_from_slice(key_pair.sign(&message).as_ref());
    })
}

fn ed25519_check(ctx: &mut CaseContext<'_>) -> Result<Sample> {
    let key_pair = ed25519_key_pair(ctx)?;
    let message = ctx.random_input("message", MESSAGE)?;
    let sig = key_pair.sign(&message);
    let public = signature::UnparsedPublicKey::new(&signature::ED25519, key_pair.public_key().as_ref().to_vec());

    ctx.measure_checked(|| public.verify(&message, sig.as_ref()).is_ok())
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
    fn test_nonce_length() {
        assert_eq!(aead::NONCE_LEN, 12);
    }
}
