use super::*;

fn point(id: PointId, x: i32, y: i32) -> DiscoveredPoint {
    DiscoveredPoint::new(id, coord(x, y), vec![id as f64])
}

fn agents(count: usize) -> Vec<AgentId> {
    (1..=count).map(|i| format!("rescuer-{i}")).collect()
}

fn scattered_points(seed: u64, count: u32) -> Vec<DiscoveredPoint> {
    let mut rng = SplitMix64::new(seed);
    (0..count)
        .map(|id| {
            let x = rng.next_below(40) as i32 - 20;
            let y = rng.next_below(40) as i32 - 20;
            point(id, x, y)
        })
        .collect()
}

#[test]
fn four_corners_give_one_point_per_cluster() {
    let points = vec![point(0, 1, 1), point(1, 1, -1), point(2, -1, 1), point(3, -1, -1)];
    let clusters = TaskPartitioner::default()
        .partition(&points, &agents(4))
        .unwrap();

    assert_eq!(clusters.len(), 4);
    for cluster in &clusters {
        assert_eq!(cluster.len(), 1, "cluster {} = {:?}", cluster.id, cluster.points);
    }
    assert_eq!(clusters[0].points[0].id, 3);
    assert_eq!(clusters[3].points[0].id, 0);
}

#[test]
fn every_point_lands_in_exactly_one_cluster() {
    let points = scattered_points(11, 30);
    let clusters = TaskPartitioner::default()
        .partition(&points, &agents(4))
        .unwrap();

    let mut ids: Vec<PointId> = clusters
        .iter()
        .flat_map(|cluster| cluster.points.iter().map(|point| point.id))
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..30).collect::<Vec<_>>());

    for (index, cluster) in clusters.iter().enumerate() {
        assert_eq!(cluster.id, index + 1);
        assert_eq!(cluster.agent_id, format!("rescuer-{}", index + 1));
        let ordered = cluster.points.windows(2).all(|pair| pair[0].id < pair[1].id);
        assert!(ordered, "cluster {} not ordered by id", cluster.id);
    }
}

#[test]
fn partition_is_deterministic() {
    let points = scattered_points(5, 25);
    let partitioner = TaskPartitioner::default();
    let first = partitioner.partition(&points, &agents(3)).unwrap();
    let second = partitioner.partition(&points, &agents(3)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn separated_groups_are_kept_apart() {
    let points = vec![
        point(0, 0, 0),
        point(1, 10, 10),
        point(2, 1, 0),
        point(3, 11, 10),
        point(4, 0, 1),
        point(5, 10, 11),
    ];
    let clusters = TaskPartitioner::default()
        .partition(&points, &agents(2))
        .unwrap();

    let ids = |cluster: &Cluster| cluster.points.iter().map(|p| p.id).collect::<Vec<_>>();
    assert_eq!(ids(&clusters[0]), vec![0, 2, 4]);
    assert_eq!(ids(&clusters[1]), vec![1, 3, 5]);
}

#[test]
fn no_points_gives_empty_clusters() {
    let clusters = TaskPartitioner::default().partition(&[], &agents(3)).unwrap();
    assert_eq!(clusters.len(), 3);
    assert!(clusters.iter().all(Cluster::is_empty));
}

#[test]
fn zero_clusters_is_an_error() {
    let points = vec![point(0, 0, 0)];
    assert_eq!(
        TaskPartitioner::default().partition(&points, &[]),
        Err(PartitionError::NoClusters)
    );
    assert_eq!(
        TaskPartitioner::default().assign(&[], 0),
        Err(PartitionError::NoClusters)
    );
}

#[test]
fn fewer_points_than_clusters() {
    let points = vec![point(0, 0, 0), point(1, 4, 0)];
    let clusters = TaskPartitioner::default()
        .partition(&points, &agents(3))
        .unwrap();

    let sizes: Vec<usize> = clusters.iter().map(Cluster::len).collect();
    assert_eq!(sizes.iter().sum::<usize>(), 2);
    assert!(sizes.iter().all(|size| *size <= 1));
    assert_eq!(sizes.iter().filter(|size| **size == 0).count(), 1);
}

#[test]
fn single_cluster_takes_everything() {
    let points = scattered_points(2, 8);
    let labels = TaskPartitioner::new(1).assign(&points, 1).unwrap();
    assert_eq!(labels, vec![0; 8]);
}
