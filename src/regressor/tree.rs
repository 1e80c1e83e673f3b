/// CART regression tree with squared-error splits.
///
/// Splits are chosen greedily by the largest reduction in the sum of squared
/// deviations. Candidate thresholds are midpoints between consecutive
/// distinct values of a feature; samples with `x <= threshold` go left.

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
    /// Total impurity decrease contributed by each feature.
    impurity_decrease: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    max_depth: usize,
    min_samples_split: usize,
    nodes: Vec<Node>,
    impurity_decrease: Vec<f64>,
}

impl RegressionTree {
    /// Fits a tree to the rows of `x` selected by `indices`.
    ///
    /// Inputs are assumed validated by the caller (rectangular, finite, at
    /// least one index).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        indices: Vec<usize>,
        max_depth: usize,
        min_samples_split: usize,
    ) -> Self {
        let n_features = x.first().map(|r| r.len()).unwrap_or(0);
        let mut builder = Builder {
            x,
            y,
            max_depth,
            min_samples_split: min_samples_split.max(2),
            nodes: Vec::new(),
            impurity_decrease: vec![0.0; n_features],
        };
        builder.build(indices, 0);
        RegressionTree {
            nodes: builder.nodes,
            impurity_decrease: builder.impurity_decrease,
        }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn impurity_decrease(&self) -> &[f64] {
        &self.impurity_decrease
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

impl Builder<'_> {
    fn build(&mut self, indices: Vec<usize>, depth: usize) -> usize {
        let node_id = self.nodes.len();
        let mean = indices.iter().map(|&i| self.y[i]).sum::<f64>() / indices.len() as f64;
        self.nodes.push(Node::Leaf { value: mean });

        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            return node_id;
        }
        let Some(best) = self.best_split(&indices) else {
            return node_id;
        };

        self.impurity_decrease[best.feature] += best.gain;
        let left = self.build(best.left, depth + 1);
        let right = self.build(best.right, depth + 1);
        self.nodes[node_id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        node_id
    }

    fn best_split(&self, indices: &[usize]) -> Option<BestSplit> {
        let n = indices.len();
        let total_sum: f64 = indices.iter().map(|&i| self.y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| self.y[i] * self.y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;

        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted = indices.to_vec();

        for feature in 0..self.impurity_decrease.len() {
            sorted.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 1..n {
                let yi = self.y[sorted[k - 1]];
                left_sum += yi;
                left_sq += yi * yi;

                let lo = self.x[sorted[k - 1]][feature];
                let hi = self.x[sorted[k]][feature];
                if lo >= hi {
                    continue;
                }

                let nl = k as f64;
                let nr = (n - k) as f64;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
                let gain = parent_sse - sse;

                if gain > best.map_or(1e-12, |(_, _, g)| g) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some((feature, threshold, gain));
                }
            }
        }

        let (feature, threshold, gain) = best?;
        let (left, right) = indices
            .iter()
            .partition(|&&i| self.x[i][feature] <= threshold);
        Some(BestSplit {
            feature,
            threshold,
            gain,
            left,
            right,
        })
    }
}
