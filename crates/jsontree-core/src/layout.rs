//! Layered top-down tree layout

use serde::{Deserialize, Serialize};

use crate::model::{Bounds, Position};
use crate::walker::WalkEntry;

/// Spacing between rows and leaf columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub row_height: f64,
    pub column_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 150.0,
            column_width: 200.0,
        }
    }
}

/// Positions index-aligned with the walker entries they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    positions: Vec<Position>,
}

impl Layout {
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn get(&self, index: usize) -> Option<Position> {
        self.positions.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bounds(&self) -> Bounds {
        bounds_of(self.positions.iter().copied())
    }
}

pub(crate) fn bounds_of(positions: impl Iterator<Item = Position>) -> Bounds {
    let mut bounds: Option<Bounds> = None;
    for p in positions {
        let b = bounds.get_or_insert(Bounds {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        });
        b.min_x = b.min_x.min(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_x = b.max_x.max(p.x);
        b.max_y = b.max_y.max(p.y);
    }
    bounds.unwrap_or_default()
}

/// Lay out walked entries as a top-down tree.
///
/// Rows are `depth * row_height` apart. Leaves take consecutive column slots
/// in walk order, so sibling subtrees never overlap; every parent is centered
/// over the mean of its children. Relies on the walker's pre-order, where a
/// child's index is always greater than its parent's.
pub fn layout<S>(entries: &[WalkEntry<S>], config: &LayoutConfig) -> Layout {
    let mut xs = vec![0.0_f64; entries.len()];

    let mut slot = 0usize;
    for (index, entry) in entries.iter().enumerate() {
        if entry.children.is_empty() {
            xs[index] = slot as f64 * config.column_width;
            slot += 1;
        }
    }

    for index in (0..entries.len()).rev() {
        let children = &entries[index].children;
        if !children.is_empty() {
            let sum: f64 = children.iter().map(|&c| xs[c]).sum();
            xs[index] = sum / children.len() as f64;
        }
    }

    let positions = entries
        .iter()
        .zip(xs)
        .map(|(entry, x)| Position {
            x,
            y: entry.depth as f64 * config.row_height,
        })
        .collect();

    Layout { positions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::{BuildLimits, walk};
    use serde_json::json;

    fn positions_of(doc: &serde_json::Value) -> Vec<Position> {
        let entries = walk(doc, &BuildLimits::default()).unwrap();
        layout(&entries, &LayoutConfig::default()).positions().to_vec()
    }

    #[test]
    fn test_rows_follow_depth() {
        let p = positions_of(&json!({"a": {"b": 1}}));
        let ys: Vec<f64> = p.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![0.0, 150.0, 300.0]);
    }

    #[test]
    fn test_parent_centered_over_children() {
        // root, a, a[0], a[1], b
        let p = positions_of(&json!({"a": [1, 2], "b": 3}));
        assert_eq!(p[2].x, 0.0);
        assert_eq!(p[3].x, 200.0);
        assert_eq!(p[1].x, 100.0);
        assert_eq!(p[4].x, 400.0);
        assert_eq!(p[0].x, 250.0);
    }

    #[test]
    fn test_empty_container_takes_own_slot() {
        let p = positions_of(&json!({"x": {}, "y": []}));
        assert_eq!(p[1].x, 0.0);
        assert_eq!(p[2].x, 200.0);
        assert_eq!(p[0].x, 100.0);
    }

    #[test]
    fn test_siblings_strictly_ordered() {
        let doc = json!({"a": {"p": 1, "q": {"r": [1, 2, 3]}}, "b": [[], {"s": 0}], "c": null});
        let entries = walk(&doc, &BuildLimits::default()).unwrap();
        let layout = layout(&entries, &LayoutConfig::default());
        for entry in &entries {
            let xs: Vec<f64> = entry
                .children
                .iter()
                .map(|&c| layout.positions()[c].x)
                .collect();
            assert!(xs.windows(2).all(|w| w[0] < w[1]), "{xs:?}");
        }
    }

    #[test]
    fn test_bounds() {
        let doc = json!([1, 2, 3]);
        let entries = walk(&doc, &BuildLimits::default()).unwrap();
        let bounds = layout(&entries, &LayoutConfig::default()).bounds();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.max_x, 400.0);
        assert_eq!(bounds.max_y, 150.0);
    }

    #[test]
    fn test_custom_spacing() {
        let doc = json!([1, 2]);
        let entries = walk(&doc, &BuildLimits::default()).unwrap();
        let config = LayoutConfig {
            row_height: 10.0,
            column_width: 30.0,
        };
        let p = layout(&entries, &config);
        assert_eq!(p.get(2), Some(Position { x: 30.0, y: 10.0 }));
        assert_eq!(p.get(0), Some(Position { x: 15.0, y: 0.0 }));
    }
}
