use super::gene::Gene;
use fxhash::FxHashSet;
use rand::{Rng, RngCore};

/// An ordered collection that refuses duplicate keys. Membership is a hash lookup, elements are
/// addressable by position, and [GeneSet::insert_sorted] keeps innovation order.
#[derive(Debug, Clone)]
pub struct GeneSet<T: Gene> {
    data: Vec<T>,
    keys: FxHashSet<T::Key>,
}

impl<T: Gene> Default for GeneSet<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            keys: FxHashSet::default(),
        }
    }
}

impl<T: Gene> GeneSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.data.iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.data.get(idx)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.data.get_mut(idx)
    }

    #[inline]
    pub fn contains(&self, gene: &T) -> bool {
        self.keys.contains(&gene.key())
    }

    #[inline]
    pub fn contains_key(&self, key: T::Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn find(&self, key: T::Key) -> Option<&T> {
        if !self.contains_key(key) {
            return None;
        }
        self.data.iter().find(|g| g.key() == key)
    }

    pub(crate) fn find_mut(&mut self, key: T::Key) -> Option<&mut T> {
        if !self.contains_key(key) {
            return None;
        }
        self.data.iter_mut().find(|g| g.key() == key)
    }

    pub fn random_index(&self, rng: &mut impl RngCore) -> Option<usize> {
        (!self.data.is_empty()).then(|| rng.random_range(0..self.data.len()))
    }

    pub fn random(&self, rng: &mut impl RngCore) -> Option<&T> {
        self.random_index(rng).map(|idx| &self.data[idx])
    }

    /// Append `gene` unless its key is already present
    pub fn insert(&mut self, gene: T) -> bool {
        if !self.keys.insert(gene.key()) {
            return false;
        }
        self.data.push(gene);
        true
    }

    /// Insert `gene` after every element with a lower or equal innovation number, unless its key
    /// is already present
    pub fn insert_sorted(&mut self, gene: T) -> bool {
        if !self.keys.insert(gene.key()) {
            return false;
        }
        let at = self.data.partition_point(|g| g.inno() <= gene.inno());
        self.data.insert(at, gene);
        true
    }

    pub fn remove(&mut self, key: T::Key) -> Option<T> {
        if !self.keys.remove(&key) {
            return None;
        }
        let idx = self.data.iter().position(|g| g.key() == key)?;
        Some(self.data.remove(idx))
    }

    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        let keys = &mut self.keys;
        self.data.retain(|g| {
            let keep = f(g);
            if !keep {
                keys.remove(&g.key());
            }
            keep
        });
    }

    pub fn sort(&mut self) {
        self.data.sort_by_key(|g| g.inno());
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.keys.clear();
    }
}

impl<T: Gene> FromIterator<T> for GeneSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for gene in iter {
            set.insert(gene);
        }
        set
    }
}

impl<'a, T: Gene> IntoIterator for &'a GeneSet<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
