//! Value types shared by requests and responses.
//!
//! # Module Organization
//!
//! ```text
//! types/
//! ├── headers - Case-insensitive ordered header store
//! ├── blob    - Typed immutable bytes
//! ├── stream  - ByteStream and its writer
//! ├── signal  - AbortController / AbortSignal
//! └── url     - Url with synchronized search params
//! ```

mod blob;
mod headers;
mod signal;
mod stream;
mod url;

pub use blob::{Blob, BlobPart};
pub use headers::{Headers, HeadersInit};
pub use signal::{AbortController, AbortSignal};
pub use stream::{ByteStream, StreamWriter};
pub use self::url::{SearchParamsMut, Url};
