/// Disjoint sets over the indices `0..len()`, growing one element at a time.
#[derive(Debug, Clone, Default)]
pub struct FindUnion {
    /// If parents[i] = j, the j-th element represents the set the i-th element resides in.
    parents: Vec<usize>,
    /// Size of the set. Only meaningful for representatives; None otherwise.
    sizes: Vec<Option<usize>>,
}

impl FindUnion {
    fn len(&self) -> usize {
        self.parents.len()
    }
    /// Add a new singleton set and return its index.
    pub fn push(&mut self) -> usize {
        let index = self.parents.len();
        self.parents.push(index);
        self.sizes.push(Some(1));
        index
    }
    /// Find the representative of `index`, compressing the path on the way.
    /// Return None if the index is out of range.
    pub fn find(&mut self, index: usize) -> Option<usize> {
        if index >= self.len() {
            return None;
        }
        let mut root = index;
        while root != self.parents[root] {
            root = self.parents[root];
        }
        let mut index = index;
        while index != root {
            let next = self.parents[index];
            self.parents[index] = root;
            index = next;
        }
        Some(root)
    }
    /// Merge the sets of `node1` and `node2`, the smaller one under the larger.
    /// Return None if either index is out of range.
    pub fn unite(&mut self, node1: usize, node2: usize) -> Option<()> {
        let parent1 = self.find(node1)?;
        let parent2 = self.find(node2)?;
        if parent1 == parent2 {
            return Some(());
        }
        let (large, small) = if self.sizes[parent1] >= self.sizes[parent2] {
            (parent1, parent2)
        } else {
            (parent2, parent1)
        };
        self.parents[small] = large;
        self.sizes[large] = Some(self.sizes[large]? + self.sizes[small]?);
        self.sizes[small] = None;
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_len(len: usize) -> FindUnion {
        let mut fu = FindUnion::default();
        for i in 0..len {
            assert_eq!(fu.push(), i);
        }
        fu
    }

    #[test]
    fn push() {
        let mut fu = with_len(2);
        assert_eq!(fu.push(), 2);
        assert_eq!(fu.find(2), Some(2));
        assert_eq!(fu.find(3), None);
    }

    #[test]
    fn unite() {
        let mut fu = with_len(10);
        assert_eq!(Some(()), fu.unite(1, 3));
        assert_eq!(Some(()), fu.unite(3, 3));
        assert_eq!(None, fu.unite(100, 0));
        assert_eq!(None, fu.unite(10, 3));
        assert_eq!(None, fu.unite(3, 10));
    }

    #[test]
    fn transitive() {
        let mut fu = with_len(10);
        fu.unite(0, 1);
        fu.unite(4, 2);
        fu.unite(1, 4);
        assert_eq!(fu.find(0), fu.find(2));
        assert_ne!(fu.find(0), fu.find(8));
    }

    #[test]
    fn chain() {
        let mut fu = with_len(10);
        for i in 0..9 {
            fu.unite(i, i + 1);
        }
        let root = fu.find(0).unwrap();
        assert!((0..10).all(|i| fu.find(i) == Some(root)));
    }

    #[test]
    fn larger_set_keeps_its_root() {
        let mut fu = with_len(4);
        fu.unite(0, 1);
        fu.unite(0, 2);
        let root = fu.find(0).unwrap();
        fu.unite(3, 0);
        assert_eq!(fu.find(3), Some(root));
    }
}
