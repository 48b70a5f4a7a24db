mod signer;
mod rsa;
mod key;
mod policy;
mod encoding;

pub use signer::PolicySigner;
pub use self::rsa::RsaSha1Signer;
pub use key::{BEGIN_PRIVATE_KEY, END_PRIVATE_KEY, parse_private_key};
pub use policy::CannedPolicy;
pub use encoding::{from_url_safe_base64, to_url_safe_base64};
