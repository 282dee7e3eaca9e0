//! Defines the named failures of a trigger registration run.

use thiserror::Error;

/// Errors raised while validating the plugin configuration or while
/// binding triggers to functions. Failures coming from the parameter
/// store itself are propagated as they are.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The `custom.dynamicTrigger` block is absent.
    #[error("dynamic trigger configuration is missing")]
    ConfigMissing,

    /// The `custom.dynamicTrigger` block doesn't have the expected
    /// shape.
    #[error("dynamic trigger configuration is not valid: {0}")]
    ConfigInvalid(String),

    /// A configured parameter path wasn't returned by the parameter
    /// store.
    #[error("parameter {0:?} was not found in the parameter store")]
    MissingParameter(String),

    /// An ARN names a service that can't be bound as a trigger, or
    /// isn't an ARN at all.
    #[error("wrong aws service in arn {arn:?} ({reason}); only sns, sqs and kinesis can be handled")]
    UnsupportedService { arn: String, reason: String },
}
