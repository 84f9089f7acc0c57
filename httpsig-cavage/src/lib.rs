mod algorithm;
mod body_digest;
mod context;
mod crypto;
mod error;
mod header_list;
mod key;
mod key_store;
mod message;
mod signature_dates;
mod signature_params;
mod signer;
mod signing_string;
mod util;
mod verification;
mod verifier;

#[cfg(test)]
mod test_keys;

pub mod prelude {
  pub mod crypto {
    pub use crate::crypto::{HashAlgorithm, KeyFamily, KeyType, PrivateKey, PublicKey, SharedKey, SigningKey, VerifyingKey};
  }

  pub use crate::{
    algorithm::{Algorithm, DigestName, Family, HS2019},
    body_digest::{BodyDigest, DIGEST_HEADER},
    context::Context,
    crypto::HashAlgorithm,
    error::{HttpSigError, HttpSigResult},
    header_list::{HeaderList, CREATED, EXPIRES, REQUEST_TARGET},
    key::{CryptoKey, KeyClass},
    key_store::{KeyResolver, KeyStore},
    message::HttpMessage,
    signature_dates::SignatureDates,
    signature_params::{ParameterValue, ParsedSignatureParameters, SignatureParameters, SignatureParametersParser},
    signer::{Signer, AUTHORIZATION_HEADER, SIGNATURE_HEADER, SIGNATURE_SCHEME},
    signing_string::SigningString,
    verification::{SignatureHeaderKind, Verification, VerificationPolicy},
    verifier::Verifier,
  };
}

/* ----------------------------------------------------------------- */
