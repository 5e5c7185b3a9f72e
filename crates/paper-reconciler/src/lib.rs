//! Host-config contract and a synchronous diffing root.
//!
//! A [`Root`] keeps the last committed element tree. Each call to
//! [`Root::update_container`] runs a render phase that creates new instances
//! bottom-up without attaching them anywhere visible, followed by a commit
//! phase that removes, places and updates instances in tree order through the
//! [`HostConfig`] implementation.

mod element;
mod error;
mod host;
mod root;

pub use element::{Child, Element};
pub use error::ReconcileError;
pub use host::{EventPriority, HostConfig, HostNode};
pub use root::{HostElement, Root};

#[cfg(test)]
#[path = "tests/root_tests.rs"]
mod tests;
