//! Restricted permutations over exchangeable blocks.
//!
//! Permutation blocks are an `(n, k)` table of integer labels. Column by
//! column, samples sharing a label are grouped recursively; the groups left
//! after the last column are blocks whose samples may be shuffled among
//! themselves. Groups that share a parent may also trade places with one
//! another. A negative label pins its group: it keeps its position among its
//! siblings and nothing inside it moves.

use crate::error::{HyppoError, Result};
use crate::matrix::Matrix;
use indexmap::IndexMap;
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone)]
enum Node {
    Leaf { label: i64, samples: Vec<usize> },
    Branch { label: i64, children: Vec<Node> },
}

impl Node {
    fn label(&self) -> i64 {
        match self {
            Node::Leaf { label, .. } | Node::Branch { label, .. } => *label,
        }
    }

    fn is_fixed(&self) -> bool {
        self.label() < 0
    }

    fn samples(&self) -> Vec<usize> {
        match self {
            Node::Leaf { samples, .. } => samples.clone(),
            Node::Branch { children, .. } => children.iter().flat_map(Node::samples).collect(),
        }
    }

    fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        if self.is_fixed() {
            return self.samples();
        }
        match self {
            Node::Leaf { samples, .. } => {
                let mut out = samples.clone();
                out.shuffle(rng);
                out
            }
            Node::Branch { children, .. } => {
                let mut parts: Vec<Vec<usize>> =
                    children.iter().map(|c| c.shuffled(rng)).collect();
                // only unpinned children trade places
                let slots: Vec<usize> = children
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_fixed())
                    .map(|(i, _)| i)
                    .collect();
                let mut movable: Vec<Vec<usize>> =
                    slots.iter().map(|&i| std::mem::take(&mut parts[i])).collect();
                movable.shuffle(rng);
                for (slot, part) in slots.into_iter().zip(movable) {
                    parts[slot] = part;
                }
                parts.concat()
            }
        }
    }
}

/// Tree of exchangeable blocks built from a permutation-block table.
#[derive(Debug, Clone)]
pub struct PermutationTree {
    root: Node,
    order: Vec<usize>,
}

impl PermutationTree {
    /// Build from one row of labels per sample.
    pub fn new(blocks: &[Vec<i64>]) -> Result<Self> {
        let depth = blocks
            .first()
            .map(Vec::len)
            .ok_or_else(|| HyppoError::PermBlocks("no rows".into()))?;
        if depth == 0 {
            return Err(HyppoError::PermBlocks("no label columns".into()));
        }
        if let Some(i) = blocks.iter().position(|r| r.len() != depth) {
            return Err(HyppoError::PermBlocks(format!(
                "row {i} has {} labels, expected {depth}",
                blocks[i].len()
            )));
        }
        let root = build(blocks, (0..blocks.len()).collect(), 0, 0);
        let order = root.samples();
        Ok(Self { root, order })
    }

    /// Build from a matrix of integral labels.
    pub fn from_matrix(m: &Matrix) -> Result<Self> {
        let mut rows = Vec::with_capacity(m.nrows());
        for r in m.rows_iter() {
            let labels = r
                .iter()
                .map(|&v| {
                    if v.fract() == 0.0 && v.is_finite() {
                        Ok(v as i64)
                    } else {
                        Err(HyppoError::PermBlocks(format!("label {v} is not an integer")))
                    }
                })
                .collect::<Result<Vec<i64>>>()?;
            rows.push(labels);
        }
        Self::new(&rows)
    }

    /// Number of samples covered by the tree.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ensure the blocks describe exactly `n` samples.
    pub fn check_len(&self, n: usize) -> Result<()> {
        if self.len() != n {
            return Err(HyppoError::PermBlocks(format!(
                "blocks cover {} samples but the data has {n}",
                self.len()
            )));
        }
        Ok(())
    }

    /// Draw a permutation `p` respecting the blocks: row `i` of the permuted
    /// sample is row `p[i]` of the original.
    pub fn permute<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let shuffled = self.root.shuffled(rng);
        let mut perm = vec![0; self.order.len()];
        for (&slot, sample) in self.order.iter().zip(shuffled) {
            perm[slot] = sample;
        }
        perm
    }
}

fn build(blocks: &[Vec<i64>], samples: Vec<usize>, col: usize, label: i64) -> Node {
    if col == blocks[0].len() {
        return Node::Leaf { label, samples };
    }
    let mut groups: IndexMap<i64, Vec<usize>> = IndexMap::new();
    for s in samples {
        groups.entry(blocks[s][col]).or_default().push(s);
    }
    let children = groups
        .into_iter()
        .map(|(lab, members)| build(blocks, members, col + 1, lab))
        .collect();
    Node::Branch { label, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn blocks_move_as_a_unit() {
        let blocks: Vec<Vec<i64>> = (0..12).map(|i| vec![(i / 4) as i64]).collect();
        let tree = PermutationTree::new(&blocks).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            let p = tree.permute(&mut rng);
            let mut sorted = p.clone();
            sorted.sort();
            assert_eq!(sorted, (0..12).collect::<Vec<_>>());
            for chunk in p.chunks(4) {
                let block = chunk[0] / 4;
                assert!(chunk.iter().all(|s| s / 4 == block));
            }
        }
    }

    #[test]
    fn negative_labels_are_pinned() {
        let blocks: Vec<Vec<i64>> = vec![vec![-1], vec![-1], vec![2], vec![2], vec![2]];
        let tree = PermutationTree::new(&blocks).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let p = tree.permute(&mut rng);
            assert_eq!(&p[..2], &[0, 1]);
        }
    }
}
