//! Spatial voxel index: the ground truth of the built world.
//!
//! Voxels are keyed by their exact [`CellKey`], so at most one voxel can ever
//! occupy a cell. A secondary id map resolves the voxel ids clients send.

use crate::error::IndexError;
use shared::{CellKey, Voxel};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct VoxelIndex {
    cells: HashMap<CellKey, Voxel>,
    ids: HashMap<String, CellKey>,
}

impl VoxelIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, cell: &CellKey) -> Option<&Voxel> {
        self.cells.get(cell)
    }

    pub fn get_mut(&mut self, cell: &CellKey) -> Option<&mut Voxel> {
        self.cells.get_mut(cell)
    }

    pub fn is_occupied(&self, cell: &CellKey) -> bool {
        self.cells.contains_key(cell)
    }

    pub fn get_by_id(&self, voxel_id: &str) -> Option<&Voxel> {
        self.ids.get(voxel_id).and_then(|cell| self.cells.get(cell))
    }

    pub fn get_by_id_mut(&mut self, voxel_id: &str) -> Option<&mut Voxel> {
        let cell = *self.ids.get(voxel_id)?;
        self.cells.get_mut(&cell)
    }

    /// Inserts a voxel at its canonical cell. Fails without modifying the
    /// index if the cell is taken.
    pub fn insert(&mut self, voxel: Voxel) -> Result<CellKey, IndexError> {
        let cell = voxel.cell();
        if self.cells.contains_key(&cell) {
            return Err(IndexError::Occupied(cell));
        }
        self.ids.insert(voxel.id.clone(), cell);
        self.cells.insert(cell, voxel);
        Ok(cell)
    }

    pub fn remove(&mut self, cell: &CellKey) -> Option<Voxel> {
        let voxel = self.cells.remove(cell)?;
        self.ids.remove(&voxel.id);
        Some(voxel)
    }

    pub fn remove_by_id(&mut self, voxel_id: &str) -> Option<Voxel> {
        let cell = self.ids.get(voxel_id).copied()?;
        self.remove(&cell)
    }

    /// Occupied cells among the six axis-adjacent neighbors of `cell`.
    pub fn occupied_neighbors(&self, cell: &CellKey) -> impl Iterator<Item = CellKey> + '_ {
        cell.neighbors6()
            .into_iter()
            .filter(move |n| self.cells.contains_key(n))
    }

    pub fn cells(&self) -> impl Iterator<Item = &CellKey> {
        self.cells.keys()
    }

    pub fn voxels(&self) -> impl Iterator<Item = &Voxel> {
        self.cells.values()
    }

    /// All voxels ordered bottom-up, for stable snapshots.
    pub fn snapshot(&self) -> Vec<Voxel> {
        let mut cells: Vec<&CellKey> = self.cells.keys().collect();
        cells.sort_by_key(|c| (c.y, c.x, c.z));
        cells
            .into_iter()
            .filter_map(|c| self.cells.get(c).cloned())
            .collect()
    }
}
