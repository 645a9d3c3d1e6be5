use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Ordered list of nested form rows (vehicles, itinerary days, ...).
///
/// Every edit returns a new snapshot and leaves the receiver untouched, so
/// an edit can be discarded by keeping the old value.
#[derive(Debug, PartialEq)]
pub struct IndexedCollection<T> {
    items: Arc<Vec<T>>,
}

impl<T> Clone for IndexedCollection<T> {
    fn clone(&self) -> Self {
        Self { items: Arc::clone(&self.items) }
    }
}

impl<T> Default for IndexedCollection<T> {
    fn default() -> Self {
        Self { items: Arc::new(Vec::new()) }
    }
}

impl<T: Clone> IndexedCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self { items: Arc::new(items) }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.items.as_ref().clone()
    }

    pub fn push(&self, item: T) -> Self {
        let mut items = self.to_vec();
        items.push(item);
        Self::from_vec(items)
    }

    pub fn insert(&self, index: usize, item: T) -> Result<Self, CollectionError> {
        if index > self.len() {
            return Err(self.out_of_range(index));
        }
        let mut items = self.to_vec();
        items.insert(index, item);
        Ok(Self::from_vec(items))
    }

    pub fn remove(&self, index: usize) -> Result<Self, CollectionError> {
        self.check(index)?;
        let mut items = self.to_vec();
        items.remove(index);
        Ok(Self::from_vec(items))
    }

    pub fn replace(&self, index: usize, item: T) -> Result<Self, CollectionError> {
        self.update(index, |slot| *slot = item)
    }

    pub fn update(&self, index: usize, edit: impl FnOnce(&mut T)) -> Result<Self, CollectionError> {
        self.check(index)?;
        let mut items = self.to_vec();
        edit(&mut items[index]);
        Ok(Self::from_vec(items))
    }

    /// Rewrite every row with knowledge of its position.
    pub fn map_indexed(&self, mut f: impl FnMut(usize, &T) -> T) -> Self {
        Self::from_vec(self.items.iter().enumerate().map(|(i, item)| f(i, item)).collect())
    }

    fn check(&self, index: usize) -> Result<(), CollectionError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(self.out_of_range(index))
        }
    }

    fn out_of_range(&self, index: usize) -> CollectionError {
        CollectionError::OutOfRange { index, len: self.len() }
    }
}

impl<T: Clone> From<Vec<T>> for IndexedCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_vec(items)
    }
}

impl<T: Serialize> Serialize for IndexedCollection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.as_ref().serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for IndexedCollection<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|items| Self { items: Arc::new(items) })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("Row {index} does not exist (collection has {len})")]
    OutOfRange { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_leave_previous_snapshot_alone() {
        let v1 = IndexedCollection::from_vec(vec!["land cruiser", "minivan"]);
        let v2 = v1.push("overland truck");
        let v3 = v2.remove(0).unwrap();
        let v4 = v3.replace(1, "balloon").unwrap();

        assert_eq!(v1.to_vec(), vec!["land cruiser", "minivan"]);
        assert_eq!(v2.len(), 3);
        assert_eq!(v3.to_vec(), vec!["minivan", "overland truck"]);
        assert_eq!(v4.to_vec(), vec!["minivan", "balloon"]);
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let rows = IndexedCollection::from_vec(vec![1, 2]);

        assert_eq!(rows.remove(2), Err(CollectionError::OutOfRange { index: 2, len: 2 }));
        assert!(rows.update(5, |n| *n += 1).is_err());
        assert!(rows.insert(3, 9).is_err());
        assert_eq!(rows.insert(2, 9).unwrap().to_vec(), vec![1, 2, 9]);
    }

    #[test]
    fn test_map_indexed() {
        let rows = IndexedCollection::from_vec(vec!['b', 'c', 'a']);
        let numbered = rows.map_indexed(|i, c| if i == 0 { c.to_ascii_uppercase() } else { *c });
        assert_eq!(numbered.to_vec(), vec!['B', 'c', 'a']);
    }
}
