//! Container configuration

/// Defines what happens to a cached asynchronous build once it fails
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The failed build stays cached and every subsequent resolution
    /// of that name yields the same error until the instance is cleared
    #[default]
    Cache,
    /// The failed build is removed from the cache as soon as it settles,
    /// so the next resolution runs the build function again
    Evict,
}

/// Represents a container configuration
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerConfig {
    /// Specifies how failed asynchronous builds are cached
    ///
    /// Default: [`FailurePolicy::Cache`]
    failure_policy: FailurePolicy,
}

impl ContainerConfig {
    /// Creates a default container configuration
    ///
    /// Defaults:
    /// - failure_policy: [`FailurePolicy::Cache`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures how failed asynchronous builds are cached
    ///
    /// Default: [`FailurePolicy::Cache`]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Configures the container to evict failed asynchronous builds
    pub fn with_failure_eviction(self) -> Self {
        self.with_failure_policy(FailurePolicy::Evict)
    }

    /// Returns the configured [`FailurePolicy`]
    #[inline]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }
}
