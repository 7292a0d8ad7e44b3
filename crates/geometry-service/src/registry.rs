//! Per-session shape storage.

use std::collections::HashMap;

use geode_types::{Color, ShapeProperties};
use kernel_bridge::SolidHandle;

/// One stored CAD object: the kernel handle it exclusively owns plus its
/// display state.
#[derive(Debug, Clone)]
pub struct ShapeRecord {
    pub shape_id: String,
    pub handle: SolidHandle,
    pub color: Color,
    pub visible: bool,
    pub selected: bool,
    pub highlighted: bool,
    /// Bumped on every mutation; surfaced as `MeshData.version`.
    pub version: u64,
}

impl ShapeRecord {
    pub fn new(shape_id: String, handle: SolidHandle, color: Color) -> Self {
        Self {
            shape_id,
            handle,
            color,
            visible: true,
            selected: false,
            highlighted: false,
            version: 1,
        }
    }

    pub fn properties(&self) -> ShapeProperties {
        ShapeProperties {
            shape_id: self.shape_id.clone(),
            visible: self.visible,
            selected: self.selected,
            highlighted: self.highlighted,
            color: self.color,
        }
    }
}

/// Shape storage for one session: id-keyed records plus the id counter.
///
/// The counter only ever grows — ids are never reused, even after
/// `remove` or `clear`, so every id handed out over a session's lifetime
/// stays unique.
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    shapes: HashMap<String, ShapeRecord>,
    counter: u64,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next shape id: `"shape_" + counter`. Never blocks, never fails.
    pub fn generate_shape_id(&mut self) -> String {
        self.counter += 1;
        format!("shape_{}", self.counter)
    }

    pub fn insert(&mut self, record: ShapeRecord) {
        self.shapes.insert(record.shape_id.clone(), record);
    }

    pub fn get(&self, shape_id: &str) -> Option<&ShapeRecord> {
        self.shapes.get(shape_id)
    }

    pub fn get_mut(&mut self, shape_id: &str) -> Option<&mut ShapeRecord> {
        self.shapes.get_mut(shape_id)
    }

    pub fn remove(&mut self, shape_id: &str) -> Option<ShapeRecord> {
        self.shapes.remove(shape_id)
    }

    /// Drop every record, handing them back so the caller can release the
    /// kernel handles. The counter is untouched.
    pub fn clear(&mut self) -> Vec<ShapeRecord> {
        self.shapes.drain().map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Live shape ids in creation order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<&ShapeRecord> = self.shapes.values().collect();
        ids.sort_by_key(|r| sequence_of(&r.shape_id));
        ids.into_iter().map(|r| r.shape_id.clone()).collect()
    }

    /// Live records in creation order.
    pub fn records(&self) -> Vec<&ShapeRecord> {
        let mut records: Vec<&ShapeRecord> = self.shapes.values().collect();
        records.sort_by_key(|r| sequence_of(&r.shape_id));
        records
    }
}

fn sequence_of(shape_id: &str) -> u64 {
    shape_id
        .rsplit('_')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}
