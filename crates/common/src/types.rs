//! Runtime type identity tokens.

use std::{
    any::{TypeId, type_name},
    fmt,
    hash::{Hash, Hasher},
};

/// Identity of a Rust type that can be compared and stored at runtime.
///
/// Equality and hashing only consider the [`TypeId`]. The type name is kept
/// for logs and error messages and is not guaranteed to be stable between
/// compiler versions.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Token for `T`. Works for unsized types such as `dyn Trait` and `str`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `app::events::Event<app::UserLoggedIn>`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with every module path removed, e.g. `Event<UserLoggedIn>`.
    #[must_use]
    pub fn short_name(&self) -> String {
        let mut out = String::with_capacity(self.name.len());
        let mut segment = String::new();
        for ch in self.name.chars() {
            if ch.is_alphanumeric() || ch == '_' || ch == ':' {
                segment.push(ch);
                continue;
            }
            out.push_str(last_segment(&segment));
            segment.clear();
            out.push(ch);
        }
        out.push_str(last_segment(&segment));
        out
    }

    /// Returns true when `T` is the type this key was built from.
    #[must_use]
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest, std::collections::HashSet};

    mod nested {
        pub struct Wrapper<T>(pub T);
        pub struct Payload;
        pub trait Marker {}
    }

    #[test]
    fn equality_follows_type_identity() {
        assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
        assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<u64>());
        assert!(TypeKey::of::<String>().is::<String>());
        assert!(!TypeKey::of::<String>().is::<str>());
    }

    #[test]
    fn usable_as_set_key() {
        let mut keys = HashSet::new();
        keys.insert(TypeKey::of::<nested::Payload>());
        keys.insert(TypeKey::of::<nested::Payload>());
        keys.insert(TypeKey::of::<dyn nested::Marker>());
        assert_eq!(keys.len(), 2);
    }

    #[rstest]
    #[case(TypeKey::of::<nested::Payload>(), "Payload")]
    #[case(TypeKey::of::<nested::Wrapper<nested::Payload>>(), "Wrapper<Payload>")]
    #[case(TypeKey::of::<dyn nested::Marker>(), "dyn Marker")]
    #[case(TypeKey::of::<u8>(), "u8")]
    fn short_name_strips_module_paths(#[case] key: TypeKey, #[case] expected: &str) {
        assert_eq!(key.short_name(), expected);
        assert_eq!(key.to_string(), expected);
    }
}
