//! Name-based references and resolution tokens

use super::Factory;
use std::sync::Arc;

/// A deferred, name-based handle to a service.
///
/// Creating a reference performs no registry lookup: the name is looked up
/// only when the reference is resolved, so it always resolves to the factory
/// that is registered under the name at that moment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    name: Arc<str>,
}

impl Reference {
    /// Creates a reference to a service name
    #[inline]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the referenced name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Anything that can be resolved by the container:
/// either a [`Factory`] handle or a [`Reference`]
#[derive(Debug, Clone)]
pub enum Token {
    /// Resolves with the factory's own build function
    Factory(Factory),
    /// Resolves with whatever factory is registered under the name
    Reference(Reference),
}

impl Token {
    /// Returns the name this token resolves
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            Token::Factory(factory) => factory.name(),
            Token::Reference(reference) => reference.name(),
        }
    }
}

impl From<Factory> for Token {
    #[inline]
    fn from(factory: Factory) -> Self {
        Token::Factory(factory)
    }
}

impl From<&Factory> for Token {
    #[inline]
    fn from(factory: &Factory) -> Self {
        Token::Factory(factory.clone())
    }
}

impl From<Reference> for Token {
    #[inline]
    fn from(reference: Reference) -> Self {
        Token::Reference(reference)
    }
}

impl From<&Reference> for Token {
    #[inline]
    fn from(reference: &Reference) -> Self {
        Token::Reference(reference.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Container;

    #[test]
    fn it_creates_reference_without_registration() {
        let container = Container::new();

        let reference = container.reference("db");

        assert_eq!(reference.name(), "db");
        assert!(!container.is_registered("db"));
    }

    #[test]
    fn it_compares_references_by_name() {
        assert_eq!(Reference::new("db"), Reference::new(String::from("db")));
        assert_ne!(Reference::new("db"), Reference::new("cache"));
    }

    #[test]
    fn it_converts_into_tokens() {
        let container = Container::new();
        let factory = container.register("x", || 1);
        let reference = container.reference("y");

        let tokens = [Token::from(&factory), Token::from(&reference)];

        assert!(matches!(tokens[0], Token::Factory(_)));
        assert!(matches!(tokens[1], Token::Reference(_)));
        assert_eq!(tokens[0].name(), "x");
        assert_eq!(tokens[1].name(), "y");
    }
}
