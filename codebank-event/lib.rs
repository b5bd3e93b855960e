//! Event plumbing shared by the CodeBank crates.

mod debounce;

pub use debounce::{
  AsyncHook,
  send_blocking,
};
