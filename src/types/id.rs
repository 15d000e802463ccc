// ABOUTME: Cloud resource identifiers tagged with the kind of resource they name.
// ABOUTME: Groups, instances, listeners, and target groups never mix, though all are strings.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The kind of resource an [`Id`] names.
pub trait ResourceKind {
    /// Shown by `Debug`, e.g. `GroupId("sig-1")`.
    const NAME: &'static str;
}

macro_rules! resource_kinds {
    ($($kind:ident => $alias:ident),* $(,)?) => {
        $(
            pub enum $kind {}

            impl ResourceKind for $kind {
                const NAME: &'static str = stringify!($alias);
            }

            pub type $alias = Id<$kind>;
        )*
    };
}

resource_kinds! {
    GroupKind => GroupId,
    InstanceKind => InstanceId,
    ListenerKind => ListenerArn,
    TargetGroupKind => TargetGroupArn,
}

/// Provider-assigned identifier of a `K` resource.
///
/// `set_forwarding_target(listener, target_group)` takes two ARNs; the kind
/// parameter makes swapping them a type error.
#[must_use]
pub struct Id<K> {
    value: String,
    kind: PhantomData<fn() -> K>,
}

impl<K> Id<K> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<K: ResourceKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(K::NAME).field(&self.value).finish()
    }
}

impl<K> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Id<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K> PartialEq<str> for Id<K> {
    fn eq(&self, other: &str) -> bool {
        self.value == other
    }
}

impl<K> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, K> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
