use bytes::Bytes;
use http::Response;
use http_body_util::Full;
use httpsig_cavage_hyper::{prelude::*, *};

const HMAC_SECRET_KEY: &str = r##"uzvJfB4u3N0Jy4T7NZ75MDVcr8zSTInedJtkgcu46YW4XByzNJjxBdtjUkdJPBtbmHhIDi6pcl8jsasjlTMtDQ=="##;

fn build_response() -> Response<Full<Bytes>> {
  Response::builder()
    .status(200)
    .header("date", "Sun, 05 Jan 2014 21:31:40 GMT")
    .header("content-type", "application/json")
    .body(Full::new(Bytes::from_static(b"{\"hello\": \"world!!\"}")))
    .unwrap()
}

fn main() {
  // responses have no request target, so only headers and dates are covered
  let mut context = Context::from_keys(&[("shared", &[HMAC_SECRET_KEY])]).unwrap();
  context.set_headers(&["(created)", "date", "content-type"]).unwrap();
  context.set_digest_hash_algorithm("sha512").unwrap();
  let signer = context.signer(true).unwrap();

  let res = build_response()
    .set_message_signature_with_digest_sync(&signer, SignatureHeaderKind::Signature)
    .unwrap();
  println!("Response header signed by hmac:\n{:#?}", res.headers());

  let mut verifier = context.verifier();
  verifier.set_accepted_digests(&[HashAlgorithm::Sha512]);
  let (verified, res) = res
    .verify_message_signature_with_digest_sync(&mut verifier, SignatureHeaderKind::Signature)
    .unwrap();
  assert!(verified);
  println!("Response signature is verified: {:?}", verifier.status());

  let verified = futures::executor::block_on(res.verify_body_digest()).unwrap();
  assert!(verified);
  println!("Digest header is verified");
}
