/// Numeric record identifier. Upstream character ids and post ids (millisecond
/// timestamps) both fit in an `i64`.
pub type DbId = i64;
