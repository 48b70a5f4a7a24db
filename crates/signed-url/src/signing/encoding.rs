use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Base64 with CloudFront's query-safe substitutions: `+` to `-`,
/// `=` to `_` and `/` to `~`.
pub fn to_url_safe_base64(bytes: &[u8]) -> String {
    STANDARD
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

pub fn from_url_safe_base64(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '=',
            '~' => '/',
            other => other,
        })
        .collect();
    STANDARD.decode(standard)
}
