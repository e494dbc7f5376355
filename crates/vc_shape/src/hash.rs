//! Hash containers with a fixed, `foldhash` based hasher.
//!
//! Every map in the workspace is built on [`hashbrown`] and seeded with
//! [`FixedHashState`], so iteration order only depends on the inserted keys.

use core::any::TypeId;
use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

pub use hashbrown;

// -----------------------------------------------------------------------------
// FixedHashState

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6D61_726B_6D61_7021);

/// A hasher whose results only depend on the input.
pub type FixedHasher = FoldHasher<'static>;

/// Hash state based on a fixed seed.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use vc_shape::hash::FixedHashState;
///
/// let hash = |v: u32| {
///     let mut hasher = FixedHashState.build_hasher();
///     v.hash(&mut hasher);
///     hasher.finish()
/// };
///
/// assert_eq!(hash(7), hash(7));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// Containers

/// A [`hashbrown::HashMap`] using [`FixedHashState`].
pub type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// A [`hashbrown::HashSet`] using [`FixedHashState`].
pub type HashSet<T> = hashbrown::HashSet<T, FixedHashState>;

/// A map keyed by [`TypeId`].
pub type TypeIdMap<V> = HashMap<TypeId, V>;

/// Creates an empty [`HashMap`].
///
/// `const`, so it can initialize statics.
#[inline]
pub const fn new_map<K, V>() -> HashMap<K, V> {
    hashbrown::HashMap::with_hasher(FixedHashState)
}

/// Creates an empty [`HashSet`].
#[inline]
pub const fn new_set<T>() -> HashSet<T> {
    hashbrown::HashSet::with_hasher(FixedHashState)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_id_map_round_trip() {
        let mut map: TypeIdMap<&str> = new_map();
        map.insert(TypeId::of::<u8>(), "u8");
        map.insert(TypeId::of::<i64>(), "i64");

        assert_eq!(map.get(&TypeId::of::<u8>()), Some(&"u8"));
        assert_eq!(map.get(&TypeId::of::<i64>()), Some(&"i64"));
        assert!(map.get(&TypeId::of::<u16>()).is_none());
    }
}
