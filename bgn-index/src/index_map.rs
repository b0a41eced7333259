use std::{marker::PhantomData, ops::{Index, IndexMut}};
use ustr::{UstrMap, Ustr};

pub trait IndexMapKey {
    fn get(&self) -> usize;
}

/// Insertion-ordered storage addressable both by interned key and by typed index
pub struct UstrIndexMap<T, K: IndexMapKey> {
    storage: Vec<T>,
    map: UstrMap<usize>,
    phantom: PhantomData<K>,
}

impl<T, K> Default for UstrIndexMap<T, K>
where
    K: IndexMapKey,
{
    fn default() -> Self {
        UstrIndexMap::<T, K>::new()
    }
}

impl<T: Clone, K: IndexMapKey> Clone for UstrIndexMap<T, K> {
    fn clone(&self) -> Self {
        UstrIndexMap {
            storage: self.storage.clone(),
            map: self.map.clone(),
            phantom: PhantomData,
        }
    }
}

impl<T, K> UstrIndexMap<T, K>
where
    K: IndexMapKey,
{
    pub fn new() -> UstrIndexMap<T, K> {
        UstrIndexMap {
            storage: Vec::new(),
            map: Default::default(),
            phantom: PhantomData,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.storage.iter()
    }

    pub fn get(&self, key: &Ustr) -> Option<&T> {
        self.map.get(key).map(|id| &self.storage[*id])
    }

    pub fn get_mut(&mut self, key: &Ustr) -> Option<&mut T> {
        self.map.get(key).map(|id| &mut self.storage[*id])
    }

    pub fn get_id(&self, key: &Ustr) -> Option<&usize> {
        self.map.get(key)
    }

    pub fn contains_key(&self, key: &Ustr) -> bool {
        self.map.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `value` under `key`. A key inserted twice keeps its first slot and has its value replaced, so
    /// iteration order stays the order in which keys were first seen.
    pub fn insert(&mut self, key: Ustr, value: T) -> usize {
        if let Some(id) = self.map.get(&key) {
            self.storage[*id] = value;
            return *id;
        }

        let id = self.storage.len();
        self.storage.push(value);
        self.map.insert(key, id);
        id
    }
}

impl<T, K> Index<K> for UstrIndexMap<T, K>
where
    K: IndexMapKey,
{
    type Output = T;

    fn index(&self, index: K) -> &Self::Output {
        &self.storage[index.get()]
    }
}

impl<T, K> IndexMut<K> for UstrIndexMap<T, K>
where
    K: IndexMapKey,
{
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        &mut self.storage[index.get()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Id(usize);

    impl IndexMapKey for Id {
        fn get(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn reinsert_keeps_first_seen_order() {
        let mut map: UstrIndexMap<&str, Id> = UstrIndexMap::new();
        map.insert(Ustr::from("a"), "first");
        map.insert(Ustr::from("b"), "second");
        let id = map.insert(Ustr::from("a"), "replaced");

        assert_eq!(id, 0);
        assert_eq!(map.len(), 2);
        assert_eq!(map[Id(0)], "replaced");
        assert_eq!(map.iter().copied().collect::<Vec<_>>(), vec!["replaced", "second"]);
    }
}
