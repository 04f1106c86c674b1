//! Pheromone trail matrix.

/// Pheromone levels on directed edges between a subset of nodes.
///
/// Only edges `u → v` with `u != v` and both endpoints in the subset carry
/// pheromone. The matrix is normalised so those entries sum to 1, both at
/// creation and after every [`update`](Self::update).
///
/// # Examples
///
/// ```
/// use td_routing::aco::PheromoneMatrix;
///
/// let mut p = PheromoneMatrix::new(4, &[0, 1, 2]);
/// assert!((p.total() - 1.0).abs() < 1e-12);
/// assert_eq!(p.get(0, 3), 0.0);
///
/// p.update(&[(vec![0, 1, 2, 0], 30.0)], 0.5, 10.0);
/// assert!((p.total() - 1.0).abs() < 1e-12);
/// assert!(p.get(0, 1) > p.get(1, 0));
/// ```
#[derive(Debug, Clone)]
pub struct PheromoneMatrix {
    size: usize,
    in_subset: Vec<bool>,
    data: Vec<f64>,
}

impl PheromoneMatrix {
    /// Creates a uniform matrix over the ordered pairs of `nodes`.
    pub fn new(size: usize, nodes: &[usize]) -> Self {
        let mut in_subset = vec![false; size];
        for &v in nodes {
            if v < size {
                in_subset[v] = true;
            }
        }
        let mut matrix = Self {
            size,
            in_subset,
            data: vec![0.0; size * size],
        };
        matrix.reset();
        matrix
    }

    /// Pheromone on edge `from → to`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sum over all entries.
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }

    fn is_edge(&self, from: usize, to: usize) -> bool {
        from != to && self.in_subset[from] && self.in_subset[to]
    }

    fn reset(&mut self) {
        let k = self.in_subset.iter().filter(|&&b| b).count();
        let pairs = k * k.saturating_sub(1);
        if pairs == 0 {
            return;
        }
        let value = 1.0 / pairs as f64;
        for from in 0..self.size {
            for to in 0..self.size {
                self.data[from * self.size + to] = if self.is_edge(from, to) { value } else { 0.0 };
            }
        }
    }

    /// Evaporates, reinforces and renormalises.
    ///
    /// Every entry is multiplied by `rho`; then each path deposits
    /// `q / cost` on each of its consecutive edges. If nothing is left
    /// (for example `rho == 0` and no deposit) the matrix resets to
    /// uniform.
    pub fn update(&mut self, paths: &[(Vec<usize>, f64)], rho: f64, q: f64) {
        for v in &mut self.data {
            *v *= rho;
        }
        for (path, cost) in paths {
            if !(*cost > 0.0 && cost.is_finite()) {
                continue;
            }
            let amount = q / cost;
            for edge in path.windows(2) {
                let (from, to) = (edge[0], edge[1]);
                if self.is_edge(from, to) {
                    self.data[from * self.size + to] += amount;
                }
            }
        }
        self.normalize();
    }

    fn normalize(&mut self) {
        let total = self.total();
        if total > 0.0 && total.is_finite() {
            for v in &mut self.data {
                *v /= total;
            }
        } else {
            self.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_over_subset() {
        let p = PheromoneMatrix::new(5, &[0, 2, 4]);
        assert!((p.get(0, 2) - 1.0 / 6.0).abs() < 1e-12);
        assert_eq!(p.get(0, 0), 0.0);
        assert_eq!(p.get(1, 2), 0.0);
        assert!((p.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_update_keeps_uniform() {
        let mut p = PheromoneMatrix::new(3, &[0, 1, 2]);
        p.update(&[(vec![0, 1, 2, 0], 10.0)], 1.0, 0.0);
        assert!((p.get(0, 1) - 1.0 / 6.0).abs() < 1e-12);
        assert!((p.get(2, 1) - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_full_evaporation_resets() {
        let mut p = PheromoneMatrix::new(3, &[0, 1, 2]);
        p.update(&[], 0.0, 1.0);
        assert!((p.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reinforced_edges_grow() {
        let mut p = PheromoneMatrix::new(3, &[0, 1, 2]);
        let before = p.get(0, 1);
        p.update(&[(vec![0, 1, 0], 5.0)], 0.9, 1.0);
        assert!(p.get(0, 1) > before);
        assert!(p.get(0, 2) < before);
        assert!((p.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_infeasible_cost_ignored() {
        let mut p = PheromoneMatrix::new(3, &[0, 1, 2]);
        p.update(&[(vec![0, 1, 0], f64::INFINITY)], 1.0, 1.0);
        assert!((p.get(0, 1) - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_node_subset_is_empty() {
        let p = PheromoneMatrix::new(3, &[0]);
        assert_eq!(p.total(), 0.0);
    }
}
