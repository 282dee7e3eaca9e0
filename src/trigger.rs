//! Defines a _trigger_, the event bound to a function for each ARN
//! stored in the parameter store.

use crate::arn;
use crate::error::Error;
use serde::Serialize;

/// A single event in a function's `events` list. Serializes as a
/// one-key mapping from the event category to the ARN, e.g.
/// `{"stream": "arn:aws:kinesis:..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerEvent {
    Sns(String),
    Sqs(String),
    Stream(String),
}

impl TriggerEvent {
    /// Classify an ARN by its service field.
    pub fn from_arn(arn: &str) -> Result<Self, Error> {
        let unsupported = |reason: String| Error::UnsupportedService {
            arn: arn.to_string(),
            reason,
        };
        let service =
            arn::service(arn).ok_or_else(|| unsupported(String::from("malformed arn")))?;
        match service {
            "sns" => Ok(TriggerEvent::Sns(arn.to_string())),
            "sqs" => Ok(TriggerEvent::Sqs(arn.to_string())),
            "kinesis" => Ok(TriggerEvent::Stream(arn.to_string())),
            other => Err(unsupported(format!("unknown service {:?}", other))),
        }
    }

    /// The ARN the event is bound to.
    pub fn arn(&self) -> &str {
        match self {
            TriggerEvent::Sns(arn) | TriggerEvent::Sqs(arn) | TriggerEvent::Stream(arn) => arn,
        }
    }
}

/// Builds the events of a function from the raw comma-separated
/// parameter value. Segments aren't trimmed and empty ones aren't
/// skipped, so a stray comma is an error. The first bad ARN fails the
/// whole list.
pub fn parse_triggers(value: &str) -> Result<Vec<TriggerEvent>, Error> {
    value.split(',').map(TriggerEvent::from_arn).collect()
}
