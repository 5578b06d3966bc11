#![deny(missing_docs)]

//! # Back-office Models
//!
//! Core data types shared by the back-office console gateway, its API
//! client and the development identity provider.
//!
//! ## Authentication flow
//!
//! ```text
//! Credentials ──(identity exchange)──▶ IdentityToken
//!                                        │ decode access token
//!                                        ▼
//!                                  DecodedClaims ──▶ IdentityResult
//!                                                        │ on_login
//!                                                        ▼
//!                                                  SessionRecord ──(on_session_read)──▶ PublicSession
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`credentials`] | `Credentials`, `LoginVariant` |
//! | [`token`] | `IdentityToken` as returned by the identity provider |
//! | [`claims`] | `DecodedClaims` read from an access token payload |
//! | [`session`] | `IdentityResult`, `SessionRecord`, `PublicSession` |

pub mod claims;
pub mod credentials;
pub mod error;
pub mod session;
pub mod token;

// Re-export all public types at crate root for convenience.
pub use claims::*;
pub use credentials::*;
pub use error::*;
pub use session::*;
pub use token::*;
