//! Dependency Injection container and tools

use crate::{
    config::{ContainerConfig, FailurePolicy},
    error::Error,
};
use futures_util::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;
use std::{
    any::Any,
    collections::HashMap,
    fmt::{Debug, Formatter},
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

pub use self::{
    factory::{AsyncBuild, Factory, FactoryKind, SyncBuild},
    instance::{Instance, PendingInstance},
    reference::{Reference, Token},
    resolved::Resolved,
};

use self::factory::Build;

pub mod factory;
pub mod instance;
pub mod reference;
pub mod resolved;

pub(crate) type ArcService = Arc<
    dyn Any
    + Send
    + Sync
>;

pub(crate) type BuildFuture = BoxFuture<'static, Result<ArcService, Error>>;

/// Registered factories in registration order
type FactoryMap = IndexMap<Arc<str>, Factory>;

/// Instance cache, one slot per name
type InstanceMap = HashMap<Arc<str>, Arc<Slot>>;

/// A cache slot of a single name.
///
/// `init` serializes build functions of that name, the map lock is never held
/// while a build runs. An empty slot means the name is not cached.
#[derive(Default)]
struct Slot {
    instance: OnceLock<Instance>,
    init: Mutex<()>,
}

#[derive(Default)]
struct Inner {
    config: ContainerConfig,
    factories: RwLock<FactoryMap>,
    instances: Mutex<InstanceMap>,
    next_build_id: AtomicU64,
}

impl Inner {
    #[inline]
    fn factories(&self) -> RwLockReadGuard<'_, FactoryMap> {
        self.factories.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn factories_mut(&self) -> RwLockWriteGuard<'_, FactoryMap> {
        self.factories.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn instances(&self) -> MutexGuard<'_, InstanceMap> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drops a failed build from the cache unless it has been replaced meanwhile
    fn evict(&self, name: &str, build_id: u64) {
        let mut instances = self.instances();
        let is_same_build = instances
            .get(name)
            .and_then(|slot| slot.instance.get())
            .and_then(Instance::as_pending)
            .is_some_and(|pending| pending.id() == build_id);
        if is_same_build {
            instances.remove(name);
            #[cfg(feature = "tracing")]
            tracing::warn!("evicted failed build of service: {name}");
        }
    }
}

/// Represents a DI container that maps names to lazily built singletons.
///
/// The container is a cheap handle: clones share the same registry and
/// instance cache, so it can be moved into build functions and futures.
///
/// # Example
/// ```
/// use named_di::{Container, error::Error};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Error> {
/// let container = Container::new();
///
/// let port = container.register("port", || 8080u16);
/// let url = container.register_async("url", move |c: Container| {
///     let port = port.clone();
///     async move {
///         let port = c.get::<u16>(&port)?;
///         Ok::<_, Error>(format!("http://localhost:{port}"))
///     }
/// });
///
/// let url = container.get_async::<String>(&url).await?;
/// assert_eq!(*url, "http://localhost:8080");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Debug for Container {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("config", &self.inner.config)
            .field("factories", &self.inner.factories().len())
            .field("instances", &self.inner
                .instances()
                .values()
                .filter(|slot| slot.instance.get().is_some())
                .count())
            .finish()
    }
}

impl Container {
    /// Creates an empty container with the default configuration
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container with a specific configuration
    ///
    /// # Example
    /// ```
    /// use named_di::{Container, ContainerConfig};
    ///
    /// let container = Container::with_config(ContainerConfig::new().with_failure_eviction());
    /// ```
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            inner: Arc::new(Inner { config, ..Inner::default() }),
        }
    }

    /// Returns the container configuration
    #[inline]
    pub fn config(&self) -> &ContainerConfig {
        &self.inner.config
    }

    /// Registers a synchronous build function under `name` and returns its [`Factory`].
    ///
    /// A previous registration under the same name is replaced. Already cached
    /// instances are kept: call [`Container::clear_instance`] to rebuild them.
    pub fn register<T, F, Args>(&self, name: impl Into<Arc<str>>, build: F) -> Factory
    where
        T: Send + Sync + 'static,
        F: SyncBuild<Args, Output = T>
    {
        self.install(Factory::from_sync(name.into(), build))
    }

    /// Registers an asynchronous build function under `name` and returns its [`Factory`].
    ///
    /// A previous registration under the same name is replaced. Already cached
    /// instances are kept: call [`Container::clear_instance`] to rebuild them.
    pub fn register_async<T, F, Args>(&self, name: impl Into<Arc<str>>, build: F) -> Factory
    where
        T: Send + Sync + 'static,
        F: AsyncBuild<Args, Output = T>
    {
        self.install(Factory::from_async(name.into(), build))
    }

    fn install(&self, factory: Factory) -> Factory {
        #[cfg(feature = "tracing")]
        tracing::trace!("registered {:?} service: {}", factory.kind(), factory.name());

        self.inner
            .factories_mut()
            .insert(factory.shared_name().clone(), factory.clone());
        factory
    }

    /// Creates a [`Reference`] to `name`.
    ///
    /// The name does not have to be registered yet.
    #[inline]
    pub fn reference(&self, name: impl Into<Arc<str>>) -> Reference {
        Reference::new(name)
    }

    /// Returns `true` if a factory is registered under `name`
    #[inline]
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.factories().contains_key(name)
    }

    /// Returns `true` if resolution of `name` has been initiated and not cleared since
    #[inline]
    pub fn is_cached(&self, name: &str) -> bool {
        self.inner
            .instances()
            .get(name)
            .is_some_and(|slot| slot.instance.get().is_some())
    }

    /// Returns all registered names in their first registration order
    pub fn registered_names(&self) -> Vec<String> {
        self.inner
            .factories()
            .keys()
            .map(|name| name.to_string())
            .collect()
    }

    /// Resolves a single [`Factory`] or [`Reference`].
    ///
    /// A cached instance is returned as is. Otherwise the build function runs
    /// and its result, or its pending future for asynchronous factories,
    /// is cached before it is returned. Never waits for an asynchronous build.
    ///
    /// Concurrent callers of a cold name wait for the one caller that runs the build.
    pub fn resolve_one(&self, token: impl Into<Token>) -> Result<Instance, Error> {
        let factory = self.factory_for(token.into())?;
        self.instantiate(&factory)
    }

    /// Resolves a batch of tokens in order and returns them keyed by name.
    ///
    /// Asynchronous factories are returned as pending instances, use
    /// [`Container::resolve_async`] to wait for them.
    pub fn resolve<I>(&self, tokens: I) -> Result<Resolved, Error>
    where
        I: IntoIterator,
        I::Item: Into<Token>
    {
        let mut resolved = Resolved::default();
        for token in tokens {
            let instance = self.resolve_one(token)?;
            resolved.insert(instance);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!("resolved {} services", resolved.len());

        Ok(resolved)
    }

    /// Resolves a batch of tokens and waits for all of their asynchronous builds.
    ///
    /// All builds are started, or taken from the cache, when this method is called.
    /// They are then awaited concurrently and the first failure fails the whole batch.
    pub fn resolve_async<I>(&self, tokens: I) -> impl Future<Output = Result<Resolved, Error>> + Send + 'static + use<I>
    where
        I: IntoIterator,
        I::Item: Into<Token>
    {
        let resolved = self.resolve(tokens);
        async move { resolved?.settle().await }
    }

    /// Resolves a single token and returns its built service as `T`.
    ///
    /// Fails with [`Error::NotReady`] for asynchronous factories, see [`Container::get_async`].
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self, token: impl Into<Token>) -> Result<Arc<T>, Error> {
        self.resolve_one(token)?.downcast()
    }

    /// Resolves a single token and waits for its service as `T`
    pub fn get_async<T: Send + Sync + 'static>(
        &self,
        token: impl Into<Token>
    ) -> impl Future<Output = Result<Arc<T>, Error>> + Send + 'static {
        let instance = self.resolve_one(token);
        async move { instance?.wait::<T>().await }
    }

    /// Removes the cached instance of `name`, so the next resolution builds it again.
    ///
    /// Holders of a pending build of the removed instance still observe it settle.
    pub fn clear_instance(&self, name: &str) {
        let _removed = self.inner.instances().remove(name);

        #[cfg(feature = "tracing")]
        if _removed.is_some() {
            tracing::trace!("cleared instance of service: {name}");
        }
    }

    /// Removes every cached instance, registrations are kept
    pub fn clear_all_instances(&self) {
        self.inner.instances().clear();

        #[cfg(feature = "tracing")]
        tracing::trace!("cleared all instances");
    }

    /// Picks the factory a token resolves with
    fn factory_for(&self, token: Token) -> Result<Factory, Error> {
        match token {
            Token::Factory(factory) => Ok(factory),
            Token::Reference(reference) => self.inner
                .factories()
                .get(reference.name())
                .cloned()
                .ok_or_else(|| Error::NotFound(reference.name().into())),
        }
    }

    fn instantiate(&self, factory: &Factory) -> Result<Instance, Error> {
        let name = factory.shared_name();
        let slot = self.slot(name);
        if let Some(instance) = slot.instance.get() {
            #[cfg(feature = "tracing")]
            tracing::trace!("resolved cached service: {name}");
            return Ok(instance.clone());
        }

        // Other threads resolving this name wait here and reuse the built instance
        let _init = slot.init.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = slot.instance.get() {
            return Ok(instance.clone());
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("building service: {name}");

        // A failed synchronous build leaves the slot empty
        let instance = match factory.build_fn() {
            Build::Sync(build) => Instance::ready(name.clone(), build(self)?),
            Build::Async(build) => {
                let build_id = self.inner.next_build_id.fetch_add(1, Ordering::Relaxed);
                let future = match self.inner.config.failure_policy() {
                    FailurePolicy::Cache => build(self),
                    FailurePolicy::Evict => evict_on_failure(
                        Arc::downgrade(&self.inner),
                        name.clone(),
                        build_id,
                        build(self)),
                };
                Instance::pending(PendingInstance::new(name.clone(), build_id, future))
            }
        };

        Ok(slot.instance.get_or_init(|| instance).clone())
    }

    /// Returns the cache slot of `name`, inserting an empty one if needed
    #[inline]
    fn slot(&self, name: &Arc<str>) -> Arc<Slot> {
        self.inner
            .instances()
            .entry(name.clone())
            .or_default()
            .clone()
    }
}

fn evict_on_failure(inner: Weak<Inner>, name: Arc<str>, build_id: u64, build: BuildFuture) -> BuildFuture {
    async move {
        let result = build.await;
        if result.is_err() && let Some(inner) = inner.upgrade() {
            inner.evict(&name, build_id);
        }
        result
    }
    .boxed()
}
