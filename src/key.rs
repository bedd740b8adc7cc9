//! Service key types for the activation kernel.

use std::any::TypeId;

/// Key identifying a service or implementation type.
///
/// Keys pair the `TypeId` used for lookup with the type name used in
/// diagnostics and error messages. Equality and hashing only look at the
/// `TypeId`.
///
/// # Examples
///
/// ```rust
/// use ferrous_kernel::{Key, key_of_type};
/// use std::any::TypeId;
///
/// let key = key_of_type::<String>();
/// assert_eq!(key.type_id(), TypeId::of::<String>());
/// assert_eq!(key.display_name(), "alloc::string::String");
/// assert_eq!(key.short_name(), "String");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Creates a key from a `TypeId` and its display name.
    pub const fn new(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    /// The underlying `TypeId`.
    #[inline(always)]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Full type name, as reported by `std::any::type_name`.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Type name with its module path stripped (generic arguments kept).
    ///
    /// ```rust
    /// use ferrous_kernel::key_of_type;
    ///
    /// assert_eq!(key_of_type::<Vec<u8>>().short_name(), "Vec<u8>");
    /// assert_eq!(key_of_type::<u32>().short_name(), "u32");
    /// ```
    pub fn short_name(&self) -> &'static str {
        let head = self.name.split('<').next().unwrap_or(self.name);
        match head.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }

    /// Returns true if this key identifies `T`.
    #[inline(always)]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::new(TypeId::of::<T>(), std::any::type_name::<T>())
}
