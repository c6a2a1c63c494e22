//! Structural integrity: which voxels are connected to the ground.
//!
//! A voxel at `y == 0` is always supported. Any other voxel is supported only
//! through a chain of axis-adjacent voxels reaching the ground. After any
//! removal the whole world is re-checked from scratch, since one lost voxel
//! can disconnect an arbitrarily large structure.

use crate::index::VoxelIndex;
use log::debug;
use shared::{CellKey, Voxel};
use std::collections::{HashSet, VecDeque};

/// Breadth-first search seeded by every ground voxel. Returns every cell
/// reachable through occupied neighbors.
pub fn supported_cells(index: &VoxelIndex) -> HashSet<CellKey> {
    let mut supported: HashSet<CellKey> = HashSet::with_capacity(index.len());
    let mut frontier: VecDeque<CellKey> = VecDeque::new();

    for cell in index.cells().filter(|c| c.is_ground()) {
        supported.insert(*cell);
        frontier.push_back(*cell);
    }

    while let Some(cell) = frontier.pop_front() {
        for neighbor in index.occupied_neighbors(&cell) {
            if supported.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }

    supported
}

/// Removes every voxel that is no longer connected to the ground and returns
/// them, ordered bottom-up.
pub fn collapse_unsupported(index: &mut VoxelIndex) -> Vec<Voxel> {
    let supported = supported_cells(index);
    if supported.len() == index.len() {
        return Vec::new();
    }

    let mut doomed: Vec<CellKey> = index
        .cells()
        .filter(|c| !supported.contains(c))
        .copied()
        .collect();
    doomed.sort_by_key(|c| (c.y, c.x, c.z));

    let collapsed: Vec<Voxel> = doomed.iter().filter_map(|c| index.remove(c)).collect();
    debug!("Collapsed {} unsupported voxels", collapsed.len());
    collapsed
}

/// Whether a voxel placed at `start` would be supported. `start` itself need
/// not be occupied; the walk only steps through existing voxels and stops at
/// the first ground cell it reaches.
pub fn is_supported_from(index: &VoxelIndex, start: CellKey) -> bool {
    if start.is_ground() {
        return true;
    }

    let mut visited: HashSet<CellKey> = HashSet::new();
    let mut stack: Vec<CellKey> = vec![start];
    visited.insert(start);

    while let Some(cell) = stack.pop() {
        for neighbor in index.occupied_neighbors(&cell) {
            if neighbor.is_ground() {
                return true;
            }
            if visited.insert(neighbor) {
                stack.push(neighbor);
            }
        }
    }

    false
}

/// Cells reachable from `seed` through occupied neighbors whose voxel passes
/// `include`. The seed is always part of the component when occupied.
pub fn connected_component<F>(index: &VoxelIndex, seed: CellKey, include: F) -> Vec<CellKey>
where
    F: Fn(&Voxel) -> bool,
{
    if !index.is_occupied(&seed) {
        return Vec::new();
    }

    let mut visited: HashSet<CellKey> = HashSet::new();
    let mut frontier: VecDeque<CellKey> = VecDeque::new();
    let mut component = Vec::new();
    visited.insert(seed);
    frontier.push_back(seed);

    while let Some(cell) = frontier.pop_front() {
        component.push(cell);
        for neighbor in index.occupied_neighbors(&cell) {
            if visited.contains(&neighbor) {
                continue;
            }
            visited.insert(neighbor);
            if index.get(&neighbor).is_some_and(&include) {
                frontier.push_back(neighbor);
            }
        }
    }

    component
}
