use serde::Serialize;

use crate::error::{Result, SignedUrlError};

/// CloudFront canned policy: the resource is readable by anyone holding
/// the URL until `expires` (seconds since the epoch).
///
/// Field order is significant; CloudFront rebuilds the same document from
/// the URL and compares signatures, so serialization must stay compact and
/// in this exact shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CannedPolicy<'a> {
    statement: [Statement<'a>; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Statement<'a> {
    resource: &'a str,
    condition: Condition,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Condition {
    date_less_than: EpochTime,
}

#[derive(Debug, Serialize)]
struct EpochTime {
    #[serde(rename = "AWS:EpochTime")]
    epoch_time: i64,
}

impl<'a> CannedPolicy<'a> {
    pub fn new(resource: &'a str, expires: i64) -> Self {
        Self {
            statement: [Statement {
                resource,
                condition: Condition {
                    date_less_than: EpochTime { epoch_time: expires },
                },
            }],
        }
    }

    pub fn expires(&self) -> i64 {
        self.statement[0].condition.date_less_than.epoch_time
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| SignedUrlError::Signing(format!("serializing canned policy: {e}")))
    }
}
