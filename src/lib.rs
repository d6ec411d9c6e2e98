//! # Evp-Kit: Structured Errors over the OpenSSL EVP Surface
//!
//! `evp-kit` is a typed façade over OpenSSL's key-management and
//! symmetric/asymmetric primitive surface. It does two things and nothing
//! else:
//!
//! - **Error normalization**: libcrypto reports failure through sentinel
//!   return values plus a thread-local error queue. Every fallible native
//!   call in this crate is wrapped so that failures surface as a structured
//!   [`Error`] carrying the drained queue messages, and successes never leak
//!   stale queue entries into a later failure.
//! - **Key classification**: the untyped key-details surface becomes a
//!   closed, algorithm-specific variant set
//!   ([`KeyDetails`]`::{Rsa, Dsa, Dh, Ec}`) with explicit structured fields.
//!
//! The crate never implements a cryptographic algorithm itself; all
//! cryptography is delegated to the native library through the `openssl`
//! crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use evp_kit::{AsymmetricKey, KeyParams, KeyDetails, primitives};
//!
//! fn main() -> evp_kit::Result<()> {
//!     let key = AsymmetricKey::generate(&KeyParams::Rsa { bits: 2048 })?;
//!
//!     let signature = primitives::sign(b"hello", &key, "sha256")?;
//!     assert!(primitives::verify(b"hello", &signature, &key, "sha256")?.is_valid());
//!
//!     match key.details()? {
//!         KeyDetails::Rsa(rsa) => assert!(!rsa.n.is_empty()),
//!         other => panic!("unexpected key family: {}", other.type_name()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod curves;
pub mod error;
pub mod key;
pub mod methods;
pub mod primitives;
pub mod secret;

pub use error::{Error, Result};
pub use key::details::{DhDetails, DsaDetails, EcDetails, KeyDetails, RsaDetails};
pub use key::params::{DhParams, KeyParams};
pub use key::{AsymmetricKey, DEFAULT_EXPORT_CIPHER};
pub use primitives::{DEFAULT_SEAL_METHOD, Options, Sealed, Verification};
pub use secret::SecretBytes;

/// The version of the `evp-kit` crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
