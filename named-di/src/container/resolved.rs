//! A batch of resolved services keyed by name

use super::{Error, Instance, PendingInstance};
use futures_util::future::try_join_all;
use std::{collections::HashMap, sync::Arc};

/// Services returned by [`Container::resolve`](super::Container::resolve)
/// and [`Container::resolve_async`](super::Container::resolve_async), keyed by name
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    instances: HashMap<Arc<str>, Instance>,
}

impl Resolved {
    /// Returns the built service `name` as `T`.
    ///
    /// Fails with [`Error::Missing`] if the name was not requested
    /// and with [`Error::NotReady`] if it is still a pending build.
    #[inline]
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, Error> {
        self.instance(name)
            .ok_or_else(|| Error::Missing(name.into()))?
            .downcast()
    }

    /// Returns the [`Instance`] resolved for `name`
    #[inline]
    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    /// Returns the pending build resolved for `name`, if it is one
    #[inline]
    pub fn pending(&self, name: &str) -> Option<&PendingInstance> {
        self.instance(name).and_then(Instance::as_pending)
    }

    /// Returns the resolved names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instances.keys().map(|name| name.as_ref())
    }

    /// Returns the number of resolved services
    #[inline]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if nothing was resolved
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    #[inline]
    pub(crate) fn insert(&mut self, instance: Instance) {
        self.instances.insert(instance.name().into(), instance);
    }

    /// Waits for every pending build concurrently, fails on the first failure
    pub(crate) async fn settle(self) -> Result<Self, Error> {
        let instances = try_join_all(self.instances
            .into_iter()
            .map(|(name, instance)| async move {
                instance.settle().await.map(|instance| (name, instance))
            }))
            .await?;
        Ok(Self { instances: instances.into_iter().collect() })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Container, Token, error::Error};

    #[test]
    fn it_collapses_duplicate_names() {
        let container = Container::new();
        let n = container.register("n", || 1);

        let resolved = container.resolve([Token::from(&n), container.reference("n").into()]).unwrap();

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.names().collect::<Vec<_>>(), vec!["n"]);
    }

    #[test]
    fn it_fails_on_missing_name() {
        let resolved = Container::new().resolve(Vec::<Token>::new()).unwrap();

        assert!(resolved.is_empty());
        assert_eq!(resolved.get::<i32>("n").unwrap_err(), Error::Missing("n".into()));
    }

    #[tokio::test]
    async fn it_exposes_pending_builds() {
        let container = Container::new();
        let n = container.register("n", || 1);
        let m = container.register_async("m", || async { 2 });

        let resolved = container.resolve([&n, &m]).unwrap();

        assert!(resolved.pending("n").is_none());

        let m = resolved.pending("m").unwrap();

        assert_eq!(*m.wait::<i32>().await.unwrap(), 2);
    }
}
