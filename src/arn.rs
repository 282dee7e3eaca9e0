//! Reads fields out of Amazon Resource Names.

/// The number of colon-delimited fields of an ARN:
/// `arn:partition:service:region:account:resource`. The resource may
/// itself contain colons.
const FIELDS: usize = 6;

/// Extract the service of an ARN. Returns `None` unless the `arn`
/// prefix and all six fields are present; the fields may be empty.
pub fn service(arn: &str) -> Option<&str> {
    let fields: Vec<&str> = arn.splitn(FIELDS, ':').collect();
    if fields.len() != FIELDS || fields[0] != "arn" {
        return None;
    }
    Some(fields[2])
}
