//! Backend selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use speed_core::{BenchCase, BenchError};

use crate::{ring_crypto, rust_crypto};

/// Library whose primitives are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// RustCrypto ciphers, MACs and hashes with dalek curves
    RustCrypto,
    /// BoringSSL-derived `ring`
    Ring,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::RustCrypto, Backend::Ring];

    /// Name used in configuration and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Backend::RustCrypto => "rustcrypto",
            Backend::Ring => "ring",
        }
    }

    /// Report heading
    pub fn title(self) -> &'static str {
        match self {
            Backend::RustCrypto => "RustCrypto + dalek",
            Backend::Ring => "ring",
        }
    }

    /// Cases in report order
    pub fn cases(self) -> &'static [BenchCase] {
        match self {
            Backend::RustCrypto => rust_crypto::CASES,
            Backend::Ring => ring_crypto::CASES,
        }
    }

    /// Cases whose name contains `filter` (case-insensitive)
    pub fn select(self, filter: Option<&str>) -> Vec<BenchCase> {
        let cases = self.cases().iter().copied();
        match filter {
            Some(f) => {
                let f = f.to_lowercase();
                cases.filter(|c| c.name.to_lowercase().contains(&f)).collect()
            }
            None => cases.collect(),
        }
    }
}

impl FromStr for Backend {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rustcrypto" | "rust-crypto" | "dalek" => Ok(Backend::RustCrypto),
            "ring" => Ok(Backend::Ring),
            _ => Err(BenchError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a list of backend names, keeping order and dropping duplicates
pub fn parse_backends<S: AsRef<str>>(names: &[S]) -> Result<Vec<Backend>, BenchError> {
    let mut backends = Vec::with_capacity(names.len());
    for name in names {
        let backend: Backend = name.as_ref().parse()?;
        if !backends.contains(&backend) {
            backends.push(backend);
        }
    }
    Ok(backends)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for backend in Backend::ALL {
            assert_eq!(backend.name().parse::<Backend>().unwrap(), backend);
            assert_eq!(backend.to_string(), backend.name());
        }
        assert_eq!("Dalek".parse::<Backend>().unwrap(), Backend::RustCrypto);
        assert!(matches!("openssl".parse::<Backend>(), Err(BenchError::UnknownBackend(_))));
    }

    #[test]
    fn test_parse_backends_dedups() {
        let parsed = parse_backends(&["ring", "rustcrypto", "ring"]).unwrap();
        assert_eq!(parsed, vec![Backend::Ring, Backend::RustCrypto]);
    }

    #[test]
    fn test_select_filters_by_name() {
        let eddsa = Backend::Ring.select(Some("eddsa"));
        assert_eq!(eddsa.len(), 2);
        assert!(eddsa.iter().all(|c| c.name.starts_with("EdDSA")));
        assert_eq!(Backend::RustCrypto.select(None).len(), Backend::RustCrypto.cases().len());
    }

    #[test]
    fn test_shared_primitives_use_same_labels() {
        for name in ["Auth'd encryption", "SHA-512", "x25519", "EdDSA(sign)", "EdDSA(check)"] {
            for backend in Backend::ALL {
                assert!(
                    backend.cases().iter().any(|c| c.name == name),
                    "{backend} lacks {name}"
                );
            }
        }
    }
}
