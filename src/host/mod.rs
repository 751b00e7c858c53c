//! 宿主模块
//!
//! Reference plugin host: realm tree, namespaced method table with result
//! caching, pre-start / post-stop extension points and the three call
//! sites (`Server`, `Toolkit`, `Request`) the registry is reached through.

pub mod cache;
pub mod ext;
pub mod server;
pub mod toolkit;

pub use cache::{MethodTable, memoize};
pub use ext::ExtRegistry;
pub use server::{Phase, Server, ServerHandle};
pub use toolkit::{Request, Toolkit};
