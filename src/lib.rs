pub mod error;
pub mod smf;

pub use error::{DecodeError, Error};
pub use smf::{analyze, DecodeOptions, ParseResult, SmfDecoder};
