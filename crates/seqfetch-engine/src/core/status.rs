/// How a fragment response status is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200: the body is the fragment.
    Found,
    /// 404: the fragment does not exist.
    Missing,
    /// Anything else aborts the run.
    Unexpected,
}

/// Classify an HTTP status code for a fragment request.
///
/// Only 200 and 404 carry meaning. Redirects are expected to be followed by
/// the client before a status reaches this point, so a 3xx here is treated
/// like any other unexpected status.
///
/// # Examples
///
/// ```
/// use seqfetch_engine::core::{StatusClass, classify_status};
///
/// assert_eq!(classify_status(200), StatusClass::Found);
/// assert_eq!(classify_status(404), StatusClass::Missing);
/// assert_eq!(classify_status(503), StatusClass::Unexpected);
/// ```
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200 => StatusClass::Found,
        404 => StatusClass::Missing,
        _ => StatusClass::Unexpected,
    }
}
