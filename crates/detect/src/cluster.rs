use crate::scanner::Detection;

/// Merges overlapping detections by union-find over a disk-overlap
/// predicate, then collapses each group to a confidence-weighted
/// centroid. Each detection is modeled as a disk of radius `size / 2`
/// centered at `(row, col)`; two detections merge when their IoU
/// exceeds 0.3.
///
/// Idempotent: clustering an already-clustered set returns it unchanged,
/// since no two surviving disks still overlap past the threshold.
pub fn cluster_detections(detections: &[Detection]) -> Vec<Detection> {
    let n = detections.len();
    if n == 0 {
        return Vec::new();
    }

    let mut parent: Vec<usize> = (0..n).collect();

    for i in 0..n {
        for j in (i + 1)..n {
            if disk_iou(&detections[i], &detections[j]) > 0.3 {
                union(&mut parent, i, j);
            }
        }
    }

    let mut groups: std::collections::HashMap<usize, Vec<usize>> = std::collections::HashMap::new();
    for i in 0..n {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(i);
    }

    let mut roots: Vec<usize> = groups.keys().copied().collect();
    roots.sort_unstable();

    roots
        .into_iter()
        .map(|root| merge_group(&groups[&root], detections))
        .collect()
}

fn merge_group(indices: &[usize], detections: &[Detection]) -> Detection {
    let total_confidence: f32 = indices.iter().map(|&i| detections[i].confidence).sum();
    if total_confidence == 0.0 {
        // Degenerate case: average unweighted rather than divide by zero.
        let n = indices.len() as f32;
        let row = indices.iter().map(|&i| detections[i].row).sum::<f32>() / n;
        let col = indices.iter().map(|&i| detections[i].col).sum::<f32>() / n;
        let size = indices.iter().map(|&i| detections[i].size).sum::<f32>() / n;
        return Detection {
            row,
            col,
            size,
            confidence: 0.0,
        };
    }

    let weighted = |f: fn(&Detection) -> f32| -> f32 {
        indices
            .iter()
            .map(|&i| f(&detections[i]) * detections[i].confidence)
            .sum::<f32>()
            / total_confidence
    };

    Detection {
        row: weighted(|d| d.row),
        col: weighted(|d| d.col),
        size: weighted(|d| d.size),
        confidence: total_confidence,
    }
}

fn disk_iou(a: &Detection, b: &Detection) -> f32 {
    let r1 = a.size / 2.0;
    let r2 = b.size / 2.0;
    let dr = a.row - b.row;
    let dc = a.col - b.col;
    let d = (dr * dr + dc * dc).sqrt();

    let area1 = std::f32::consts::PI * r1 * r1;
    let area2 = std::f32::consts::PI * r2 * r2;

    let intersection = if d >= r1 + r2 {
        0.0
    } else if d <= (r1 - r2).abs() {
        std::f32::consts::PI * r1.min(r2).powi(2)
    } else {
        let d1 = (d * d - r2 * r2 + r1 * r1) / (2.0 * d);
        let d2 = d - d1;
        r1 * r1 * (d1 / r1).acos() - d1 * (r1 * r1 - d1 * d1).max(0.0).sqrt()
            + r2 * r2 * (d2 / r2).acos()
            - d2 * (r2 * r2 - d2 * d2).max(0.0).sqrt()
    };

    let union = area1 + area2 - intersection;
    if union <= 0.0 {
        0.0
    } else {
        intersection / union
    }
}

fn find(parent: &mut [usize], i: usize) -> usize {
    if parent[i] != i {
        parent[i] = find(parent, parent[i]);
    }
    parent[i]
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra] = rb;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_two_overlapping_detections_s5() {
        let detections = vec![
            Detection {
                row: 100.0,
                col: 100.0,
                size: 40.0,
                confidence: 3.0,
            },
            Detection {
                row: 101.0,
                col: 100.0,
                size: 40.0,
                confidence: 2.0,
            },
        ];
        let merged = cluster_detections(&detections);
        assert_eq!(merged.len(), 1);
        let d = merged[0];
        assert!((d.row - 100.4).abs() < 1e-4);
        assert!((d.col - 100.0).abs() < 1e-4);
        assert!((d.size - 40.0).abs() < 1e-4);
        assert!((d.confidence - 5.0).abs() < 1e-4);
    }

    #[test]
    fn leaves_far_apart_detections_unmerged() {
        let detections = vec![
            Detection {
                row: 0.0,
                col: 0.0,
                size: 10.0,
                confidence: 1.0,
            },
            Detection {
                row: 1000.0,
                col: 1000.0,
                size: 10.0,
                confidence: 1.0,
            },
        ];
        assert_eq!(cluster_detections(&detections).len(), 2);
    }

    #[test]
    fn clustering_is_idempotent() {
        let detections = vec![
            Detection {
                row: 100.0,
                col: 100.0,
                size: 40.0,
                confidence: 3.0,
            },
            Detection {
                row: 101.0,
                col: 100.0,
                size: 40.0,
                confidence: 2.0,
            },
        ];
        let once = cluster_detections(&detections);
        let twice = cluster_detections(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn confidence_is_conserved() {
        let detections = vec![
            Detection {
                row: 100.0,
                col: 100.0,
                size: 40.0,
                confidence: 3.0,
            },
            Detection {
                row: 101.0,
                col: 100.0,
                size: 40.0,
                confidence: 2.0,
            },
            Detection {
                row: 500.0,
                col: 500.0,
                size: 10.0,
                confidence: 7.0,
            },
        ];
        let total_before: f32 = detections.iter().map(|d| d.confidence).sum();
        let merged = cluster_detections(&detections);
        let total_after: f32 = merged.iter().map(|d| d.confidence).sum();
        assert!((total_before - total_after).abs() < 1e-4);
    }
}
