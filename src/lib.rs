//! Binds SNS, SQS and Kinesis triggers stored in the SSM parameter
//! store to the functions of a service document, right before the
//! host compiles function events.

pub mod app;
pub mod arn;
pub mod client;
pub mod conf;
pub mod error;
pub mod fetch;
pub mod trigger;
