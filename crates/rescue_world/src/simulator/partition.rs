//! TaskPartitioner: deterministic k-means over point coordinates.
//!
//! Seeds are spread evenly along the diagonal of the points' bounding box,
//! so the same input always yields the same clusters.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::geometry::euclidean_distance_f64;

use super::types::{AgentId, DiscoveredPoint, DEFAULT_PARTITION_MAX_ITERATIONS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("cannot partition into zero clusters")]
    NoClusters,
}

/// Points assigned to one servicing agent. `id` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub agent_id: AgentId,
    /// Ordered by point id.
    pub points: Vec<DiscoveredPoint>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

type Centroid = (f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPartitioner {
    pub max_iterations: usize,
}

impl Default for TaskPartitioner {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_PARTITION_MAX_ITERATIONS,
        }
    }
}

impl TaskPartitioner {
    pub fn new(max_iterations: usize) -> Self {
        Self { max_iterations }
    }

    /// Splits `points` into one cluster per agent. Every point lands in
    /// exactly one cluster; clusters may be empty.
    pub fn partition(
        &self,
        points: &[DiscoveredPoint],
        agent_ids: &[AgentId],
    ) -> Result<Vec<Cluster>, PartitionError> {
        let labels = self.assign(points, agent_ids.len())?;
        let mut clusters: Vec<Cluster> = agent_ids
            .iter()
            .enumerate()
            .map(|(index, agent_id)| Cluster {
                id: index + 1,
                agent_id: agent_id.clone(),
                points: Vec::new(),
            })
            .collect();
        for (point, label) in points.iter().zip(labels) {
            clusters[label].points.push(point.clone());
        }
        for cluster in &mut clusters {
            cluster.points.sort_by_key(|point| point.id);
        }
        Ok(clusters)
    }

    /// Cluster index of every point, in input order.
    pub fn assign(&self, points: &[DiscoveredPoint], k: usize) -> Result<Vec<usize>, PartitionError> {
        if k == 0 {
            return Err(PartitionError::NoClusters);
        }
        if points.is_empty() {
            return Ok(Vec::new());
        }
        let coords: Vec<Centroid> = points
            .iter()
            .map(|point| (point.coord.x as f64, point.coord.y as f64))
            .collect();

        let mut centroids = seed_centroids(&coords, k);
        let mut labels = nearest_labels(&coords, &centroids);
        let mut iterations = 0;
        while iterations < self.max_iterations {
            iterations += 1;
            update_centroids(&coords, &mut labels, &mut centroids);
            let next = nearest_labels(&coords, &centroids);
            if next == labels {
                break;
            }
            labels = next;
        }
        debug!(points = points.len(), k, iterations, "partition converged");
        Ok(labels)
    }
}

fn seed_centroids(coords: &[Centroid], k: usize) -> Vec<Centroid> {
    let (mut min, mut max) = (coords[0], coords[0]);
    for &(x, y) in coords {
        min = (min.0.min(x), min.1.min(y));
        max = (max.0.max(x), max.1.max(y));
    }
    (0..k)
        .map(|index| {
            let t = (index as f64 + 0.5) / k as f64;
            (min.0 + (max.0 - min.0) * t, min.1 + (max.1 - min.1) * t)
        })
        .collect()
}

/// Nearest centroid per point; ties go to the lower index.
fn nearest_labels(coords: &[Centroid], centroids: &[Centroid]) -> Vec<usize> {
    coords
        .iter()
        .map(|coord| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (index, centroid) in centroids.iter().enumerate() {
                let distance = euclidean_distance_f64(*coord, *centroid);
                if distance < best_distance {
                    best = index;
                    best_distance = distance;
                }
            }
            best
        })
        .collect()
}

fn mean_of(coords: &[Centroid], labels: &[usize], cluster: usize) -> Option<Centroid> {
    let mut sum = (0.0, 0.0);
    let mut count = 0usize;
    for (coord, label) in coords.iter().zip(labels) {
        if *label == cluster {
            sum = (sum.0 + coord.0, sum.1 + coord.1);
            count += 1;
        }
    }
    (count > 0).then(|| (sum.0 / count as f64, sum.1 / count as f64))
}

/// Moves every centroid to the mean of its points. An empty cluster takes
/// over the point farthest from its centroid in the most populated cluster,
/// as long as that cluster keeps at least one point.
fn update_centroids(coords: &[Centroid], labels: &mut [usize], centroids: &mut [Centroid]) {
    for cluster in 0..centroids.len() {
        if let Some(mean) = mean_of(coords, labels, cluster) {
            centroids[cluster] = mean;
        }
    }

    for empty in 0..centroids.len() {
        if labels.iter().any(|label| *label == empty) {
            continue;
        }
        let mut counts = vec![0usize; centroids.len()];
        for label in labels.iter() {
            counts[*label] += 1;
        }
        let mut donor = 0;
        for (index, count) in counts.iter().enumerate() {
            if *count > counts[donor] {
                donor = index;
            }
        }
        if counts[donor] <= 1 {
            continue;
        }

        let donor_centroid = centroids[donor];
        let mut farthest: Option<(usize, f64)> = None;
        for (index, (coord, label)) in coords.iter().zip(labels.iter()).enumerate() {
            if *label != donor {
                continue;
            }
            let distance = euclidean_distance_f64(*coord, donor_centroid);
            if farthest.map_or(true, |(_, best)| distance > best) {
                farthest = Some((index, distance));
            }
        }
        let Some((moved, _)) = farthest else {
            continue;
        };
        labels[moved] = empty;
        centroids[empty] = coords[moved];
        if let Some(mean) = mean_of(coords, labels, donor) {
            centroids[donor] = mean;
        }
        debug!(cluster = empty, donor, point_index = moved, "reseeded empty cluster");
    }
}
