//! Core traits for the activation kernel.

mod dispose;
mod resolver;

pub use dispose::{Dispose, Initializable, Startable};
pub use resolver::{DependencyResolver, Resolver};
