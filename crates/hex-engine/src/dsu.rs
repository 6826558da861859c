//! Disjoint-set forest used for incremental edge-to-edge connectivity.

#[derive(Debug, Clone)]
pub(crate) struct Dsu {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl Dsu {
    pub(crate) fn new(len: usize) -> Self {
        Dsu {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    /// Root lookup without compression, so queries can run on a shared board.
    pub(crate) fn root(&self, mut i: usize) -> usize {
        while self.parent[i] != i {
            i = self.parent[i];
        }
        i
    }

    fn find_compress(&mut self, i: usize) -> usize {
        let root = self.root(i);
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    pub(crate) fn unite(&mut self, a: usize, b: usize) {
        let mut ra = self.find_compress(a);
        let mut rb = self.find_compress(b);
        if ra == rb {
            return;
        }
        if self.rank[ra] < self.rank[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        if self.rank[ra] == self.rank[rb] {
            self.rank[ra] += 1;
        }
    }

    pub(crate) fn connected(&self, a: usize, b: usize) -> bool {
        self.root(a) == self.root(b)
    }
}
