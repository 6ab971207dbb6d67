use ndarray::Array2;

/// Statistics for a single connected component.
#[derive(Clone, Debug)]
pub struct ComponentStats {
    /// Label of this component in [`ComponentLabels::labels`], starting at 1.
    pub label: u32,
    /// Number of pixels in the component.
    pub area: usize,
    /// Bounding box, inclusive: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
}

/// Label image plus per-component statistics.
#[derive(Clone, Debug)]
pub struct ComponentLabels {
    /// 0 for background, otherwise the component label.
    pub labels: Array2<u32>,
    /// Indexed by `label - 1`.
    pub stats: Vec<ComponentStats>,
}

impl ComponentLabels {
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Perform connected component analysis on a binary mask using two-pass
/// labeling with union-find. Uses 8-connectivity (left, upper-left, upper
/// and upper-right neighbors).
///
/// Labels are compacted to `1..=n` in raster order of each component's
/// first pixel.
pub fn label_components(mask: &Array2<bool>) -> ComponentLabels {
    let (h, w) = mask.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    if h == 0 || w == 0 {
        return ComponentLabels {
            labels,
            stats: Vec::new(),
        };
    }

    let mut next_label: u32 = 1;
    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0; h * w / 2 + 2];

    // Pass 1: assign provisional labels.
    for row in 0..h {
        for col in 0..w {
            if !mask[[row, col]] {
                continue;
            }

            let mut neighbors = [0u32; 4];
            if col > 0 {
                neighbors[0] = labels[[row, col - 1]];
            }
            if row > 0 {
                if col > 0 {
                    neighbors[1] = labels[[row - 1, col - 1]];
                }
                neighbors[2] = labels[[row - 1, col]];
                if col + 1 < w {
                    neighbors[3] = labels[[row - 1, col + 1]];
                }
            }

            let smallest = neighbors.iter().copied().filter(|&l| l > 0).min();
            match smallest {
                None => {
                    // New label.
                    if next_label as usize >= parent.len() {
                        parent.resize(parent.len() * 2, 0);
                    }
                    parent[next_label as usize] = next_label;
                    labels[[row, col]] = next_label;
                    next_label += 1;
                }
                Some(smallest) => {
                    labels[[row, col]] = smallest;
                    for &other in neighbors.iter().filter(|&&l| l > 0 && l != smallest) {
                        union(&mut parent, smallest, other);
                    }
                }
            }
        }
    }

    // Flatten parent references.
    for i in 1..next_label as usize {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: compact roots to consecutive labels and collect stats.
    let mut compact = vec![0u32; next_label as usize];
    let mut stats: Vec<ComponentStats> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = parent[lbl as usize] as usize;
            if compact[root] == 0 {
                stats.push(ComponentStats {
                    label: stats.len() as u32 + 1,
                    area: 0,
                    bbox: (row, row, col, col),
                });
                compact[root] = stats.len() as u32;
            }
            let final_label = compact[root];
            labels[[row, col]] = final_label;

            let entry = &mut stats[final_label as usize - 1];
            entry.area += 1;
            entry.bbox.0 = entry.bbox.0.min(row);
            entry.bbox.1 = entry.bbox.1.max(row);
            entry.bbox.2 = entry.bbox.2.min(col);
            entry.bbox.3 = entry.bbox.3.max(col);
        }
    }

    ComponentLabels { labels, stats }
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root to keep labels consistent.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
