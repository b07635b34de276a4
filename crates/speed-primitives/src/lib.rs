//! # Primitive speed suite: backends
//!
//! Case tables for the two libraries under comparison. Both tables reuse the
//! same labels for the primitives they share, so their report lines line up.
//!
//! | Primitive | RustCrypto + dalek | ring |
//! |-----------|--------------------|------|
//! | Stream cipher | ChaCha20 | - |
//! | MAC | Poly1305, keyed BLAKE2b | HMAC-SHA512 |
//! | AEAD | XChaCha20-Poly1305 | ChaCha20-Poly1305 |
//! | Hash | SHA-512 | SHA-512 |
//! | Password hash | Argon2i | - |
//! | Key exchange | X25519 | X25519 |
//! | Signatures | Ed25519 | Ed25519 |
//! | Curve25519 scalar ops | inverse, fixed-base, ladder | - |

pub mod backend;
pub mod ring_crypto;
pub mod rust_crypto;

pub use backend::{parse_backends, Backend};
