//! Modules for grouping bindings.
//!
//! A module registers a related set of types and bindings under a name.
//! Names are unique per builder: loading a second module with a name that is
//! already loaded fails, whatever Rust module the two types live in.

use crate::error::DiResult;

use super::KernelBuilder;

/// A named unit of kernel configuration.
///
/// # Example
///
/// ```rust
/// use ferrous_kernel::{DiResult, Kernel, KernelBuilder, Module, Resolver};
///
/// struct Config {
///     url: &'static str,
/// }
///
/// struct StorageModule;
///
/// impl Module for StorageModule {
///     fn name(&self) -> Option<String> {
///         Some("storage".to_string())
///     }
///
///     fn load(&self, kernel: &mut KernelBuilder) -> DiResult<()> {
///         kernel.bind::<Config, _>(|b| b.to_method(|_| Ok(Config { url: "postgres://localhost" })));
///         Ok(())
///     }
/// }
///
/// # fn main() -> DiResult<()> {
/// let kernel = Kernel::builder().load(StorageModule)?.build()?;
/// assert!(kernel.has_module("storage"));
/// assert_eq!(kernel.get::<Config>()?.url, "postgres://localhost");
/// # Ok(())
/// # }
/// ```
pub trait Module: 'static {
    /// The name the module is loaded under; defaults to the type name.
    ///
    /// `None` or an empty name cannot be loaded.
    fn name(&self) -> Option<String> {
        Some(std::any::type_name::<Self>().to_string())
    }

    /// Adds the module's types and bindings.
    fn load(&self, kernel: &mut KernelBuilder) -> DiResult<()>;

    /// Called before the module's bindings are removed.
    fn unload(&self, _kernel: &mut KernelBuilder) {}
}

/// By-value module loading for builders assembled in one expression.
pub trait KernelBuilderExt {
    /// Loads `module` and hands the builder back.
    ///
    /// ```rust
    /// use ferrous_kernel::{DiResult, KernelBuilder, KernelBuilderExt, Module};
    ///
    /// struct Empty;
    /// impl Module for Empty {
    ///     fn load(&self, _: &mut KernelBuilder) -> DiResult<()> { Ok(()) }
    /// }
    ///
    /// # fn main() -> DiResult<()> {
    /// let mut builder = KernelBuilder::new().with_module(Empty)?;
    /// let kernel = builder.build()?;
    /// assert_eq!(kernel.modules().len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    fn with_module<M: Module>(self, module: M) -> DiResult<Self>
    where
        Self: Sized;
}

impl KernelBuilderExt for KernelBuilder {
    fn with_module<M: Module>(mut self, module: M) -> DiResult<Self> {
        self.load(module)?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiError;

    struct Unnamed;

    impl Module for Unnamed {
        fn name(&self) -> Option<String> {
            None
        }

        fn load(&self, _kernel: &mut KernelBuilder) -> DiResult<()> {
            Ok(())
        }
    }

    struct Failing;

    impl Module for Failing {
        fn load(&self, kernel: &mut KernelBuilder) -> DiResult<()> {
            kernel.bind::<u8, _>(|b| b.to_constant(1));
            Err(DiError::InvalidOperation("broken".to_string()))
        }
    }

    #[test]
    fn default_name_is_the_type_name() {
        assert!(Failing.name().unwrap().ends_with("Failing"));
    }

    #[test]
    fn unnamed_module_is_not_supported() {
        let mut builder = KernelBuilder::new();
        let err = builder.load(Unnamed).err().unwrap();
        assert!(matches!(err, DiError::NotSupported(ref m) if m.contains("no name")));
    }

    #[test]
    fn failed_load_discards_its_bindings() {
        let mut builder = KernelBuilder::new();
        assert!(builder.load(Failing).is_err());
        assert_eq!(builder.binding_count(), 0);
        assert!(!builder.has_module(&Failing.name().unwrap()));
    }
}
