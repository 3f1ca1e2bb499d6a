//! Factories and the build functions they wrap

use super::{ArcService, BuildFuture, Container, Error};
use futures_util::{FutureExt, TryFutureExt, future::BoxFuture};
use std::{
    fmt::{Debug, Formatter},
    future::Future,
    sync::Arc,
};

/// A trait that describes a synchronous build function
/// that constructs a service registered in DI container
///
/// Implemented for `Fn() -> T` and for `Fn(Container) -> Result<T, Error>`,
/// the latter may resolve its own dependencies through the container.
pub trait SyncBuild<Args>: Send + Sync + 'static {
    /// A type of object that will be built
    type Output;

    /// Calls the build function and returns either a built object or error
    fn build(&self, container: &Container) -> Result<Self::Output, Error>;
}

impl<F, R> SyncBuild<()> for F
where
    F: Fn() -> R + Send + Sync + 'static
{
    type Output = R;

    #[inline]
    fn build(&self, _: &Container) -> Result<Self::Output, Error> {
        Ok(self())
    }
}

impl<F, R> SyncBuild<(Container,)> for F
where
    F: Fn(Container) -> Result<R, Error> + Send + Sync + 'static
{
    type Output = R;

    #[inline]
    fn build(&self, container: &Container) -> Result<Self::Output, Error> {
        self(container.clone())
    }
}

/// A trait that describes an asynchronous build function
/// that constructs a service registered in DI container
///
/// Implemented for `Fn() -> impl Future<Output = T>` and for
/// `Fn(Container) -> impl Future<Output = Result<T, Error>>`.
pub trait AsyncBuild<Args>: Send + Sync + 'static {
    /// A type of object that will be built
    type Output;

    /// Calls the build function and returns a future of either a built object or error
    fn build(&self, container: &Container) -> BoxFuture<'static, Result<Self::Output, Error>>;
}

impl<F, Fut, R> AsyncBuild<()> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static
{
    type Output = R;

    #[inline]
    fn build(&self, _: &Container) -> BoxFuture<'static, Result<Self::Output, Error>> {
        self().map(Ok).boxed()
    }
}

impl<F, Fut, R> AsyncBuild<(Container,)> for F
where
    F: Fn(Container) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, Error>> + Send + 'static
{
    type Output = R;

    #[inline]
    fn build(&self, container: &Container) -> BoxFuture<'static, Result<Self::Output, Error>> {
        self(container.clone()).boxed()
    }
}

type SyncBuildFn = Arc<
    dyn Fn(&Container) -> Result<ArcService, Error>
    + Send
    + Sync
>;

type AsyncBuildFn = Arc<
    dyn Fn(&Container) -> BuildFuture
    + Send
    + Sync
>;

/// Type-erased build function of a [`Factory`]
#[derive(Clone)]
pub(crate) enum Build {
    Sync(SyncBuildFn),
    Async(AsyncBuildFn),
}

/// Describes whether a [`Factory`] builds its service directly or asynchronously
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryKind {
    /// The build function returns the service
    Sync,
    /// The build function returns a future of the service
    Async,
}

/// A handle to a registered build function.
///
/// Resolving a `Factory` always runs its own captured build function,
/// even if the name has been registered again since. Use a
/// [`Reference`](super::Reference) to resolve whatever is registered at resolve time.
#[derive(Clone)]
pub struct Factory {
    name: Arc<str>,
    build: Build,
}

impl Debug for Factory {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .finish()
    }
}

impl Factory {
    pub(crate) fn from_sync<T, F, Args>(name: Arc<str>, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: SyncBuild<Args, Output = T>
    {
        let build: SyncBuildFn = Arc::new(move |c: &Container| -> Result<ArcService, Error> {
            build.build(c).map(|t| Arc::new(t) as ArcService)
        });
        Self { name, build: Build::Sync(build) }
    }

    pub(crate) fn from_async<T, F, Args>(name: Arc<str>, build: F) -> Self
    where
        T: Send + Sync + 'static,
        F: AsyncBuild<Args, Output = T>
    {
        let build: AsyncBuildFn = Arc::new(move |c: &Container| -> BuildFuture {
            build.build(c)
                .map_ok(|t| Arc::new(t) as ArcService)
                .boxed()
        });
        Self { name, build: Build::Async(build) }
    }

    /// Returns the name this factory was registered under
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether this factory builds synchronously or asynchronously
    #[inline]
    pub fn kind(&self) -> FactoryKind {
        match self.build {
            Build::Sync(_) => FactoryKind::Sync,
            Build::Async(_) => FactoryKind::Async,
        }
    }

    #[inline]
    pub(crate) fn shared_name(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub(crate) fn build_fn(&self) -> &Build {
        &self.build
    }
}

#[cfg(test)]
mod tests {
    use crate::{Container, FactoryKind, error::Error};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct X(i32);

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Point(X, X);

    #[test]
    fn it_reports_factory_kind() {
        let container = Container::new();

        let x = container.register("x", || X(1));
        let y = container.register_async("y", || async { X(2) });

        assert_eq!(x.kind(), FactoryKind::Sync);
        assert_eq!(y.kind(), FactoryKind::Async);
        assert_eq!(x.name(), "x");
        assert_eq!(y.name(), "y");
    }

    #[test]
    fn it_builds_from_container() {
        let container = Container::new();

        let x = container.register("x", || X(1));
        let point = container.register("point", move |c: Container| {
            let x = c.get::<X>(&x)?;
            Ok(Point(*x, *x))
        });

        let point = container.get::<Point>(&point).unwrap();

        assert_eq!(*point, Point(X(1), X(1)));
    }

    #[test]
    fn it_propagates_build_errors() {
        let container = Container::new();

        let failing = container.register("failing", |_: Container| -> Result<X, Error> {
            Err(Error::other("boom"))
        });

        let err = container.resolve_one(&failing).unwrap_err();

        assert_eq!(err, Error::Other("boom".into()));
    }

    #[tokio::test]
    async fn it_builds_async_from_container() {
        let container = Container::new();

        let x = container.register("x", || X(3));
        let point = container.register_async("point", move |c: Container| {
            let x = x.clone();
            async move {
                let x = c.get::<X>(&x)?;
                Ok::<_, Error>(Point(*x, *x))
            }
        });

        let point = container.get_async::<Point>(&point).await.unwrap();

        assert_eq!(*point, Point(X(3), X(3)));
    }

    #[test]
    fn it_formats_factory_debug() {
        let container = Container::new();

        let x = container.register("x", || X(1));

        assert_eq!(format!("{x:?}"), "Factory { name: \"x\", kind: Sync }");
    }
}
