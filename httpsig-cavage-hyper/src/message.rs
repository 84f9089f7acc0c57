use crate::{
  error::{HyperSigError, HyperSigResult},
  hyper_body_digest::BodyBytes,
};
use bytes::Bytes;
use http::{header::HeaderName, HeaderMap, HeaderValue, Request, Response};
use http_body::Body;
use http_body_util::Full;
use httpsig_cavage::prelude::{HttpMessage, HttpSigError, HttpSigResult};

/* --------------------------------------- */
#[derive(Debug, Clone)]
/// Request whose body has been read into memory, so that it can be signed or verified
pub struct BufferedRequest(Request<Bytes>);

impl BufferedRequest {
  pub fn new(req: Request<Bytes>) -> Self {
    Self(req)
  }

  /// Read the whole body of `req`
  pub async fn from_request<B>(req: Request<B>) -> HyperSigResult<Self>
  where
    B: Body + Send,
    <B as Body>::Data: Send,
  {
    let (parts, body) = req.into_parts();
    let body_bytes = body
      .into_bytes()
      .await
      .map_err(|_e| HyperSigError::HttpBodyError("Failed to read request body".to_string()))?;
    Ok(Self(Request::from_parts(parts, body_bytes)))
  }

  pub fn inner(&self) -> &Request<Bytes> {
    &self.0
  }

  pub fn into_inner(self) -> Request<Bytes> {
    self.0
  }

  /// Back to a request with a body usable by hyper
  pub fn into_full(self) -> Request<Full<Bytes>> {
    let (parts, body) = self.0.into_parts();
    Request::from_parts(parts, Full::new(body))
  }
}

impl HttpMessage for BufferedRequest {
  fn method(&self) -> Option<String> {
    Some(self.0.method().as_str().to_string())
  }

  fn request_target(&self) -> Option<String> {
    let target = self
      .0
      .uri()
      .path_and_query()
      .map(|pq| pq.as_str())
      .filter(|pq| !pq.is_empty())
      .unwrap_or("/");
    Some(target.to_string())
  }

  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>> {
    header_values(self.0.headers(), name)
  }

  fn has_header(&self, name: &str) -> bool {
    self.0.headers().contains_key(name)
  }

  fn with_added_header(mut self, name: &str, value: &str) -> HttpSigResult<Self> {
    add_header(self.0.headers_mut(), name, value)?;
    Ok(self)
  }

  fn without_header(mut self, name: &str) -> Self {
    self.0.headers_mut().remove(name);
    self
  }

  fn body(&self) -> &[u8] {
    self.0.body()
  }
}

/* --------------------------------------- */
#[derive(Debug, Clone)]
/// Response whose body has been read into memory, so that it can be signed or verified
pub struct BufferedResponse(Response<Bytes>);

impl BufferedResponse {
  pub fn new(res: Response<Bytes>) -> Self {
    Self(res)
  }

  /// Read the whole body of `res`
  pub async fn from_response<B>(res: Response<B>) -> HyperSigResult<Self>
  where
    B: Body + Send,
    <B as Body>::Data: Send,
  {
    let (parts, body) = res.into_parts();
    let body_bytes = body
      .into_bytes()
      .await
      .map_err(|_e| HyperSigError::HttpBodyError("Failed to read response body".to_string()))?;
    Ok(Self(Response::from_parts(parts, body_bytes)))
  }

  pub fn inner(&self) -> &Response<Bytes> {
    &self.0
  }

  pub fn into_inner(self) -> Response<Bytes> {
    self.0
  }

  /// Back to a response with a body usable by hyper
  pub fn into_full(self) -> Response<Full<Bytes>> {
    let (parts, body) = self.0.into_parts();
    Response::from_parts(parts, Full::new(body))
  }
}

impl HttpMessage for BufferedResponse {
  fn method(&self) -> Option<String> {
    None
  }

  fn request_target(&self) -> Option<String> {
    None
  }

  fn header_values(&self, name: &str) -> HttpSigResult<Vec<String>> {
    header_values(self.0.headers(), name)
  }

  fn has_header(&self, name: &str) -> bool {
    self.0.headers().contains_key(name)
  }

  fn with_added_header(mut self, name: &str, value: &str) -> HttpSigResult<Self> {
    add_header(self.0.headers_mut(), name, value)?;
    Ok(self)
  }

  fn without_header(mut self, name: &str) -> Self {
    self.0.headers_mut().remove(name);
    self
  }

  fn body(&self) -> &[u8] {
    self.0.body()
  }
}

/* --------------------------------------- */
fn header_values(headers: &HeaderMap, name: &str) -> HttpSigResult<Vec<String>> {
  headers
    .get_all(name)
    .iter()
    .map(|v| {
      v.to_str()
        .map(|v| v.to_string())
        .map_err(|e| HttpSigError::HeaderError(format!("Header '{name}' is not visible ascii: {e}")))
    })
    .collect()
}

fn add_header(headers: &mut HeaderMap, name: &str, value: &str) -> HttpSigResult<()> {
  let name = HeaderName::from_bytes(name.as_bytes())
    .map_err(|e| HttpSigError::HeaderError(format!("Invalid header name '{name}': {e}")))?;
  let value =
    HeaderValue::from_str(value).map_err(|e| HttpSigError::HeaderError(format!("Invalid value for header '{name}': {e}")))?;
  headers.append(name, value);
  Ok(())
}
