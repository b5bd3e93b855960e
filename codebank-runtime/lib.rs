//! Side-effectful capabilities for runtime hosts: the network snippet source
//! and OS clipboards.

pub mod clipboard;
pub mod http;

pub use clipboard::OsClipboard;
pub use http::HttpSnippetSource;
