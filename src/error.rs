use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("failed to set up document source")]
    Source,
    #[display("failed to load document index")]
    Index,
    #[display("failed to show document {_0:?}")]
    Document(#[error(not(source))] String),
    #[display("failed to write output")]
    Output,
}
