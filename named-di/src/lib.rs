//! # named-di
//!
//! A small dependency injection container that maps names to lazily built singletons.
//!
//! Services are registered with either a synchronous or an asynchronous build function.
//! Each name is built at most once per cache generation: the first resolution runs the
//! build function and caches its result, later resolutions reuse it until the instance is
//! cleared. Asynchronous builds are cached as shared futures, so concurrent resolutions
//! observe one underlying build.
//!
//! ## Example
//! ```
//! use named_di::{Container, Token};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), named_di::error::Error> {
//! let container = Container::new();
//!
//! let n = container.register("n", || 1);
//! let m = container.register_async("m", || async { 2 });
//! let later = container.reference("later");
//! container.register("later", || "registered after the reference");
//!
//! let resolved = container
//!     .resolve_async([Token::from(&n), Token::from(&m), Token::from(&later)])
//!     .await?;
//!
//! assert_eq!(*resolved.get::<i32>("n")?, 1);
//! assert_eq!(*resolved.get::<i32>("m")?, 2);
//! assert_eq!(*resolved.get::<&str>("later")?, "registered after the reference");
//! # Ok(())
//! # }
//! ```

pub use crate::{
    config::{ContainerConfig, FailurePolicy},
    container::{
        AsyncBuild,
        Container,
        Factory,
        FactoryKind,
        Instance,
        PendingInstance,
        Reference,
        Resolved,
        SyncBuild,
        Token,
    },
    tagged::TaggedContainer,
};

pub mod config;
pub mod container;
pub mod error;
pub mod tagged;
