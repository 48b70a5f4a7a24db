use chrono::{DateTime, TimeZone, Utc};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha1::Sha1;

use cloudfront_signed_url::signing::{CannedPolicy, RsaSha1Signer, from_url_safe_base64, parse_private_key};
use cloudfront_signed_url::{SignedUrlError, SignedUrlIssuer};

const TEST_KEY: &str = include_str!("fixtures/private_key.pem");

// `openssl dgst -sha1 -sign private_key.pem` over the canned policy for
// https://cdn.example/1234-deadbeef expiring at 1700000060, URL-safe encoded.
const EXPECTED_SIGNATURE: &str = "Tvl0-ZTA5~qhjkZ~ccrRm1tOqrMomiqeV2RCS1Y9iulcCoc-uLvMWoDWQ-i15bHIavoB~87QFW73t~eN51XnjkYv43IkChIAt7VTHMKwIl43zHN6g1Z8rYHWC2S0UW2DnkwVoCI4jdFSDH-ZFJJ7XcwqnIh8ZEd57rloIr2mzQo7MmIMtJItyE7ysz8ZyiD49i3RdX1~mL9-BohGEoBQTAfgedA3OY9Kz~S2LggfyslU8BhB9dDubar6D7I55iC3~Qi1aLmjGXKU7koGsXJuejARTr24qmXgdDVftI7PLX4T3N0AWzh8YVQBIbkoO8byX9ofra6H-NbRS7Alo88P8w__";

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).unwrap()
}

fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
    let (_, query) = url.split_once('?').expect("url has a query");
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
        .unwrap_or_else(|| panic!("missing {name} in {url}"))
}

// ── canned policy signing ────────────────────────────────────────────

#[test]
fn matches_openssl_known_answer() {
    let signer = RsaSha1Signer::new(parse_private_key(TEST_KEY).unwrap());
    let issuer = SignedUrlIssuer::new("https://cdn.example/", 60, "APKAEXAMPLE", &signer);

    let url = issuer.issue("1234deadbeef", at(1_700_000_000)).unwrap();

    assert_eq!(
        url,
        format!(
            "https://cdn.example/1234-deadbeef?Expires=1700000060&Signature={EXPECTED_SIGNATURE}&Key-Pair-Id=APKAEXAMPLE"
        )
    );
}

#[test]
fn signature_verifies_against_policy() {
    let private_key = parse_private_key(TEST_KEY).unwrap();
    let verifying_key = VerifyingKey::<Sha1>::new(private_key.to_public_key());
    let signer = RsaSha1Signer::new(private_key);
    let issuer = SignedUrlIssuer::new("https://cdn.example/", 300, "APKAEXAMPLE", &signer);

    let url = issuer.issue("abcd0123456789", at(1_650_000_000)).unwrap();

    let expires: i64 = query_param(&url, "Expires").parse().unwrap();
    assert_eq!(expires, 1_650_000_300);
    assert_eq!(query_param(&url, "Key-Pair-Id"), "APKAEXAMPLE");

    let policy = CannedPolicy::new("https://cdn.example/abcd-0123456789", expires)
        .to_json()
        .unwrap();
    let sig_bytes = from_url_safe_base64(query_param(&url, "Signature")).unwrap();
    let signature = Signature::try_from(sig_bytes.as_slice()).unwrap();
    verifying_key.verify(policy.as_bytes(), &signature).unwrap();
}

#[test]
fn signing_is_deterministic_for_fixed_inputs() {
    let signer = RsaSha1Signer::new(parse_private_key(TEST_KEY).unwrap());
    let issuer = SignedUrlIssuer::new("https://cdn.example/", 60, "APKAEXAMPLE", &signer);

    let first = issuer.issue("1234deadbeef", at(1_700_000_000)).unwrap();
    let second = issuer.issue("1234deadbeef", at(1_700_000_000)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn one_second_later_changes_expiry_and_signature() {
    let signer = RsaSha1Signer::new(parse_private_key(TEST_KEY).unwrap());
    let issuer = SignedUrlIssuer::new("https://cdn.example/", 60, "APKAEXAMPLE", &signer);

    let first = issuer.issue("1234deadbeef", at(1_700_000_000)).unwrap();
    let later = issuer.issue("1234deadbeef", at(1_700_000_001)).unwrap();

    assert_ne!(query_param(&first, "Expires"), query_param(&later, "Expires"));
    assert_ne!(query_param(&first, "Signature"), query_param(&later, "Signature"));
}

#[test]
fn signature_uses_query_safe_alphabet() {
    let signer = RsaSha1Signer::new(parse_private_key(TEST_KEY).unwrap());
    let issuer = SignedUrlIssuer::new("https://cdn.example/", 60, "APKAEXAMPLE", &signer);

    for offset in 0..16 {
        let url = issuer.issue("1234deadbeef", at(1_700_000_000 + offset)).unwrap();
        assert!(!query_param(&url, "Signature").contains(['+', '=', '/']));
    }
}

// ── key material ─────────────────────────────────────────────────────

#[test]
fn key_without_markers_is_configuration_error() {
    let body: String = TEST_KEY
        .lines()
        .filter(|line| !line.starts_with("-----"))
        .collect();
    let err = parse_private_key(&body).unwrap_err();
    assert!(matches!(err, SignedUrlError::Configuration(_)));
}

#[test]
fn ec_key_is_key_format_error() {
    let err = parse_private_key(include_str!("fixtures/ec_private_key.pem")).unwrap_err();
    assert!(matches!(err, SignedUrlError::KeyFormat(_)));
    assert!(err.is_configuration());
}
