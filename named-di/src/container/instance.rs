//! Cached service instances

use super::{ArcService, BuildFuture, Error};
use futures_util::future::{FutureExt, Shared};
use std::{
    any::type_name,
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// A service that is being built asynchronously.
///
/// Every clone shares the one underlying build: the build runs while any
/// holder polls it and all holders observe the same output.
#[derive(Clone)]
pub struct PendingInstance {
    name: Arc<str>,
    id: u64,
    build: Shared<BuildFuture>,
}

impl Debug for PendingInstance {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingInstance")
            .field("name", &self.name)
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl PendingInstance {
    #[inline]
    pub(crate) fn new(name: Arc<str>, id: u64, build: BuildFuture) -> Self {
        Self { name, id, build: build.shared() }
    }

    /// Returns the name of the service
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the build has completed, successfully or not
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.build.peek().is_some()
    }

    /// Returns `true` if both handles share the same underlying build
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.build.ptr_eq(&other.build)
    }

    /// Waits for the build to complete and returns the service as `T`
    pub async fn wait<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        let service = self.settle().await?;
        downcast(&self.name, service)
    }

    #[inline]
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub(crate) async fn settle(&self) -> Result<ArcService, Error> {
        self.build.clone().await
    }
}

#[derive(Clone)]
enum State {
    Ready(ArcService),
    Pending(PendingInstance),
}

/// An entry of the instance cache: either a built service
/// or a [`PendingInstance`] that is still being built
#[derive(Clone)]
pub struct Instance {
    name: Arc<str>,
    state: State,
}

impl Debug for Instance {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.state {
            State::Ready(_) => f.debug_struct("Instance")
                .field("name", &self.name)
                .field("ready", &true)
                .finish(),
            State::Pending(pending) => f.debug_tuple("Instance")
                .field(pending)
                .finish(),
        }
    }
}

impl Instance {
    #[inline]
    pub(crate) fn ready(name: Arc<str>, service: ArcService) -> Self {
        Self { name, state: State::Ready(service) }
    }

    #[inline]
    pub(crate) fn pending(pending: PendingInstance) -> Self {
        Self { name: pending.name.clone(), state: State::Pending(pending) }
    }

    /// Returns the name of the service
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the instance holds a built service.
    ///
    /// Cached asynchronous services stay [`PendingInstance`] handles even after
    /// their build settles, [`Instance::downcast`] reads those once settled.
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// Returns `true` if the service is an asynchronous build handle
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, State::Pending(_))
    }

    /// Returns the pending build handle, if any
    #[inline]
    pub fn as_pending(&self) -> Option<&PendingInstance> {
        match &self.state {
            State::Pending(pending) => Some(pending),
            State::Ready(_) => None,
        }
    }

    /// Returns the built service as `T`.
    ///
    /// A settled asynchronous build yields its output. Fails with [`Error::NotReady`]
    /// if the build has not completed yet, use [`Instance::wait`] for those.
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        match &self.state {
            State::Ready(service) => downcast(&self.name, service.clone()),
            State::Pending(pending) => match pending.build.peek() {
                Some(Ok(service)) => downcast(&self.name, service.clone()),
                Some(Err(err)) => Err(err.clone()),
                None => Err(Error::NotReady(self.name.to_string())),
            },
        }
    }

    /// Returns the service as `T`, waiting for a pending build if needed
    pub async fn wait<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, Error> {
        match &self.state {
            State::Ready(service) => downcast(&self.name, service.clone()),
            State::Pending(pending) => pending.wait().await,
        }
    }

    /// Returns `true` if both instances are the same service
    /// or share the same underlying build
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.state, &other.state) {
            (State::Ready(a), State::Ready(b)) => Arc::ptr_eq(a, b),
            (State::Pending(a), State::Pending(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Turns a pending build into a ready instance once it settles
    pub(crate) async fn settle(self) -> Result<Self, Error> {
        match self.state {
            State::Ready(_) => Ok(self),
            State::Pending(pending) => {
                let service = pending.settle().await?;
                Ok(Self::ready(self.name, service))
            }
        }
    }
}

#[inline]
fn downcast<T: Send + Sync + 'static>(name: &str, service: ArcService) -> Result<Arc<T>, Error> {
    service
        .downcast::<T>()
        .map_err(|_| Error::ResolveFailed { name: name.into(), type_name: type_name::<T>() })
}
