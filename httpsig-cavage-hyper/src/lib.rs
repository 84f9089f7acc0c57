//! # httpsig-cavage-hyper
//!
//! `httpsig-cavage-hyper` is a crate that provides a convenient API for `Hyper` users to handle Cavage-draft (hs2019) HTTP signatures.
//! This crate extends hyper's http request and response messages with the ability to sign them with a `Signature` or
//! `Authorization: Signature` header, and to verify such headers.
//! Additionally it also provides a way to set and verify the `Digest` header.
//!
//! Signatures cover the body through the `Digest` header only, so every operation reads the whole body into memory
//! and hands back the message with a [`http_body_util::Full`] body.
//!
//! ## Async-first design
//!
//! The primary API is async, via [`MessageSignatureReq`] and [`MessageSignatureRes`].
//!
//! ## Blocking API
//!
//! When the `blocking` feature is enabled (on by default), synchronous wrappers are provided via
//! [`MessageSignatureReqSync`] and [`MessageSignatureResSync`]. These use `futures::executor::block_on`
//! internally and are intended **exclusively for non-async contexts**.
//!
//! # Panics
//!
//! Calling any `*_sync` method from within an async runtime (e.g. inside a `tokio::spawn` task)
//! will panic. If you are already in an async context, use the async methods directly.

mod error;
mod hyper_body_digest;
mod hyper_http;
mod message;

pub use error::{HyperSigError, HyperSigResult};
pub use httpsig_cavage::prelude;
pub use hyper_body_digest::{BodyBytes, RequestBodyDigest, ResponseBodyDigest};
#[cfg(feature = "blocking")]
pub use hyper_http::{MessageSignatureReqSync, MessageSignatureResSync};
pub use hyper_http::{MessageSignature, MessageSignatureReq, MessageSignatureRes};
pub use message::{BufferedRequest, BufferedResponse};

/* ----------------------------------------------------------------- */
