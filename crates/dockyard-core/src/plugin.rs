// ABOUTME: Explicit plugin modules listing named window factory constructors
// ABOUTME: Replaces runtime type scanning; the registry discovers factories from these lists

use crate::factory::WindowFactory;

/// Builds one window factory. May fail; discovery logs and skips failures.
pub type FactoryConstructor =
    Box<dyn Fn() -> anyhow::Result<Box<dyn WindowFactory>> + Send + Sync>;

/// A named bundle of factory constructors supplied at startup
pub struct PluginModule {
    name: String,
    constructors: Vec<(String, FactoryConstructor)>,
}

impl PluginModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructors: Vec::new(),
        }
    }

    pub fn with_constructor<F>(mut self, name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> anyhow::Result<Box<dyn WindowFactory>> + Send + Sync + 'static,
    {
        self.constructors.push((name.into(), Box::new(constructor)));
        self
    }

    /// Add a constructor for a factory that cannot fail to build
    pub fn with_factory<W, F>(self, name: impl Into<String>, make: F) -> Self
    where
        W: WindowFactory + 'static,
        F: Fn() -> W + Send + Sync + 'static,
    {
        self.with_constructor(name, move || Ok(Box::new(make()) as Box<dyn WindowFactory>))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub(crate) fn constructors(&self) -> impl Iterator<Item = (&str, &FactoryConstructor)> {
        self.constructors
            .iter()
            .map(|(name, constructor)| (name.as_str(), constructor))
    }
}

impl std::fmt::Debug for PluginModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginModule")
            .field("name", &self.name)
            .field(
                "constructors",
                &self.constructors.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}
