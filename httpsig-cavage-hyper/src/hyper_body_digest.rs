use crate::{
  error::{HyperSigError, HyperSigResult},
  message::{BufferedRequest, BufferedResponse},
};
use bytes::{Buf, Bytes};
use http::{Request, Response};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use httpsig_cavage::prelude::{BodyDigest, HttpMessage};
use std::future::Future;

/* --------------------------------------- */
pub trait BodyBytes: http_body::Body {
  /// Returns the bytes object of the body
  fn into_bytes(self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send
  where
    Self: Sized + Send,
    Self::Data: Send,
  {
    async {
      let mut body_buf = self.collect().await?.aggregate();
      Ok(body_buf.copy_to_bytes(body_buf.remaining()))
    }
  }

  /// Returns the body bytes and the `Digest` header value computed over them
  fn into_bytes_with_digest(self, digest: &BodyDigest) -> impl Future<Output = Result<(Bytes, String), Self::Error>> + Send
  where
    Self: Sized + Send,
    Self::Data: Send,
  {
    async move {
      let body_bytes = self.into_bytes().await?;
      let value = digest.digest_header_value(&body_bytes);
      Ok((body_bytes, value))
    }
  }
}

impl<T: ?Sized> BodyBytes for T where T: http_body::Body {}

/* --------------------------------------- */
/// A trait to set and verify the `Digest` header of a request
pub trait RequestBodyDigest {
  type Error;
  fn set_body_digest(self, digest: &BodyDigest) -> impl Future<Output = Result<Request<Full<Bytes>>, Self::Error>> + Send
  where
    Self: Sized;
  fn verify_body_digest(self) -> impl Future<Output = Result<bool, Self::Error>> + Send
  where
    Self: Sized;
}

/// A trait to set and verify the `Digest` header of a response
pub trait ResponseBodyDigest {
  type Error;
  fn set_body_digest(self, digest: &BodyDigest) -> impl Future<Output = Result<Response<Full<Bytes>>, Self::Error>> + Send
  where
    Self: Sized;
  fn verify_body_digest(self) -> impl Future<Output = Result<bool, Self::Error>> + Send
  where
    Self: Sized;
}

impl<B> RequestBodyDigest for Request<B>
where
  B: Body + Send,
  <B as Body>::Data: Send,
{
  type Error = HyperSigError;

  async fn set_body_digest(self, digest: &BodyDigest) -> HyperSigResult<Request<Full<Bytes>>>
  where
    Self: Sized,
  {
    let buffered = BufferedRequest::from_request(self).await?;
    let buffered = digest.set_digest_header(buffered)?;
    Ok(buffered.into_full())
  }

  async fn verify_body_digest(self) -> HyperSigResult<bool>
  where
    Self: Sized,
  {
    let buffered = BufferedRequest::from_request(self).await?;
    verify_buffered(&buffered)
  }
}

impl<B> ResponseBodyDigest for Response<B>
where
  B: Body + Send,
  <B as Body>::Data: Send,
{
  type Error = HyperSigError;

  async fn set_body_digest(self, digest: &BodyDigest) -> HyperSigResult<Response<Full<Bytes>>>
  where
    Self: Sized,
  {
    let buffered = BufferedResponse::from_response(self).await?;
    let buffered = digest.set_digest_header(buffered)?;
    Ok(buffered.into_full())
  }

  async fn verify_body_digest(self) -> HyperSigResult<bool>
  where
    Self: Sized,
  {
    let buffered = BufferedResponse::from_response(self).await?;
    verify_buffered(&buffered)
  }
}

/// A missing or malformed `Digest` header is an error, a mismatch is `false`
fn verify_buffered<M: HttpMessage>(message: &M) -> HyperSigResult<bool> {
  let digest = BodyDigest::from_message(message)?;
  Ok(digest.is_valid(message))
}

/* --------------------------------------- */
