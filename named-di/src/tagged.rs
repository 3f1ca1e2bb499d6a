//! Tag tracking on top of [`Container`]

use crate::{
    container::{AsyncBuild, Container, Factory, Reference, Resolved, SyncBuild},
    error::Error,
};
use indexmap::{IndexMap, IndexSet};
use std::{
    future::Future,
    sync::{Arc, PoisonError, RwLock},
};

type TagMap = IndexMap<String, IndexSet<Arc<str>>>;

/// A [`Container`] that also remembers which names were registered under which tags.
///
/// Tags are additive: registering a name again keeps the tags it already had.
///
/// # Example
/// ```
/// use named_di::TaggedContainer;
///
/// let container = TaggedContainer::new();
/// container.register_tagged("users", ["repository"], || vec!["alice"]);
/// container.register_tagged("orders", ["repository"], || vec![42]);
///
/// let repositories = container.resolve_tagged("repository").unwrap();
/// assert_eq!(repositories.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaggedContainer {
    container: Container,
    tags: Arc<RwLock<TagMap>>,
}

impl From<Container> for TaggedContainer {
    #[inline]
    fn from(container: Container) -> Self {
        Self { container, tags: Arc::default() }
    }
}

impl TaggedContainer {
    /// Creates an empty tagged container with the default configuration
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the inner [`Container`]
    #[inline]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Registers a synchronous build function under `name` and tags it
    pub fn register_tagged<T, F, Args, I>(&self, name: impl Into<Arc<str>>, tags: I, build: F) -> Factory
    where
        T: Send + Sync + 'static,
        F: SyncBuild<Args, Output = T>,
        I: IntoIterator,
        I::Item: Into<String>
    {
        let factory = self.container.register(name, build);
        self.tag(&factory, tags);
        factory
    }

    /// Registers an asynchronous build function under `name` and tags it
    pub fn register_async_tagged<T, F, Args, I>(&self, name: impl Into<Arc<str>>, tags: I, build: F) -> Factory
    where
        T: Send + Sync + 'static,
        F: AsyncBuild<Args, Output = T>,
        I: IntoIterator,
        I::Item: Into<String>
    {
        let factory = self.container.register_async(name, build);
        self.tag(&factory, tags);
        factory
    }

    /// Returns references to every name tagged with `tag`, in tagging order
    pub fn tagged(&self, tag: &str) -> Vec<Reference> {
        self.tags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tag)
            .map(|names| names.iter().cloned().map(Reference::new).collect())
            .unwrap_or_default()
    }

    /// Resolves every name tagged with `tag` without waiting for asynchronous builds
    #[inline]
    pub fn resolve_tagged(&self, tag: &str) -> Result<Resolved, Error> {
        self.container.resolve(self.tagged(tag))
    }

    /// Resolves every name tagged with `tag` and waits for all of them
    #[inline]
    pub fn resolve_tagged_async(&self, tag: &str) -> impl Future<Output = Result<Resolved, Error>> + Send + 'static {
        self.container.resolve_async(self.tagged(tag))
    }

    /// Clears the cached instances of every name tagged with `tag`
    pub fn clear_tagged(&self, tag: &str) {
        for reference in self.tagged(tag) {
            self.container.clear_instance(reference.name());
        }
    }

    fn tag<I>(&self, factory: &Factory, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<String>
    {
        let mut map = self.tags
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        for tag in tags {
            map.entry(tag.into())
                .or_default()
                .insert(factory.name().into());
        }
    }
}
