/// Classification for retry policy.
///
/// This crate never retries on its own. The classification is exposed so an
/// outer scheduler can decide whether a failed refresh is worth repeating.
///
/// | Class | Retry later? |
/// |-------|--------------|
/// | `Never` | No, the request itself is wrong or the data is absent |
/// | `WithBackoff` | Yes, after waiting; the provider was unreachable or throttling |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - unknown coin, missing currency entry, undecodable payload.
    Never,

    /// Retry after a backoff period.
    ///
    /// Used for connectivity failures, HTTP 429 and transient provider errors.
    WithBackoff,
}
