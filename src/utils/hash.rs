use std::collections::{HashMap, HashSet};
use std::hash::BuildHasherDefault;

pub use rustc_hash::FxHasher;

pub type FastHashMap<K, V> = HashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FastHashSet<V> = HashSet<V, BuildHasherDefault<FxHasher>>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn collections() {
        let mut map = FastHashMap::default();
        map.insert("diffuse", 1);
        map.insert("specular", 2);
        map.insert("diffuse", 3);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("diffuse"), Some(&3));

        let mut set = FastHashSet::default();
        set.insert(7u32);
        set.insert(7u32);
        assert_eq!(set.len(), 1);
    }
}
