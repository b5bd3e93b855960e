pub mod clipboard;
pub mod fetch;
pub mod handlers;
pub mod matcher;
pub mod messages;
pub mod model;
pub mod query;
pub mod render;
pub mod request;
pub mod search;
pub mod syntax;

pub use model::{
  Catalog,
  Category,
  CodeSnippet,
  DeepLink,
};
pub use render::{
  CodeRenderer,
  RenderedLine,
};
pub use search::{
  SearchEngine,
  SearchHit,
  SearchResult,
};
