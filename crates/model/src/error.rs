/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backend could not be reached, or the connection broke.
    Network,
    /// The backend responded with a non-success status.
    Status,
    /// The response body could not be decoded.
    Decode,
    /// Any other errors.
    Other,
}
