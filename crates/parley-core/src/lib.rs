//! Parley core library: bearer-token authority plus broadcast fanout.
//!
//! `parley-core` holds the logic that decides who may speak and delivers
//! what they say. It knows nothing about HTTP; the `parley-web` gateway
//! drives it.
//!
//! # Modules
//!
//! - [`authority`]: login, token issuance and verification ([`TokenAuthority`]).
//! - [`session`]: the single live token per user ([`SessionRegistry`]).
//! - [`registry`]: live connections and broadcast ([`ConnectionRegistry`]).
//! - [`token`]: JWT claims and the signing codec.
//! - [`password`]: one-way password hashing ([`CredentialHasher`]).
//! - [`store`]: user records and the injected [`CredentialStore`].
//! - [`error`]: [`AuthError`], [`RelayError`] and [`DeliveryError`].

pub mod authority;
pub mod error;
pub mod password;
pub mod registry;
pub mod session;
pub mod store;
pub mod token;

pub use authority::{SignupOutcome, TokenAuthority};
pub use error::{AuthError, AuthResult, DeliveryError, RelayError};
pub use password::{Argon2Hasher, CredentialHasher};
pub use registry::{
    BroadcastReport, ConnectionId, ConnectionRegistry, ConnectionState, MessageSink,
};
pub use session::{RevokeOutcome, SessionRegistry};
pub use store::{CredentialStore, MemoryCredentialStore, UserRecord};
pub use token::{Claims, IssuedToken};
