//! Chunked spatial index over placements.
//!
//! Placements are grouped into consecutive chunks of `chunk_size` items, each
//! with the union of its frames. A range query first rejects whole chunks by
//! their union, then tests the items of the surviving chunks.

use super::types::{Frame, PlacementRect};

/// Chunk size used when none is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq)]
struct Chunk {
    bounds: Frame,
    /// Placement range covered by this chunk.
    start: usize,
    end: usize,
}

/// Range-query index over one layout's placements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpatialIndex {
    chunks: Vec<Chunk>,
    frames: Vec<(usize, Frame)>,
}

impl SpatialIndex {
    /// Build the index. A chunk size of 0 is treated as 1.
    pub fn build(placements: &[PlacementRect], chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let frames: Vec<(usize, Frame)> = placements.iter().map(|p| (p.index, p.frame)).collect();
        let chunks = frames
            .chunks(chunk_size)
            .enumerate()
            .filter_map(|(n, chunk)| {
                let (_, first) = chunk.first()?;
                let bounds = chunk
                    .iter()
                    .skip(1)
                    .fold(*first, |bounds, (_, frame)| bounds.union(frame));
                let start = n * chunk_size;
                Some(Chunk {
                    bounds,
                    start,
                    end: start + chunk.len(),
                })
            })
            .collect();
        Self { chunks, frames }
    }

    /// Number of chunks; a query scans each chunk's bounds once.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Indices of every placement strictly overlapping `rect`, ascending.
    pub fn query(&self, rect: &Frame) -> Vec<usize> {
        let mut hits: Vec<usize> = self
            .chunks
            .iter()
            .filter(|chunk| chunk.bounds.intersects(rect))
            .flat_map(|chunk| &self.frames[chunk.start..chunk.end])
            .filter(|(_, frame)| frame.intersects(rect))
            .map(|(index, _)| *index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Index of the placement containing the point, if any.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<usize> {
        let contains = |frame: &Frame| {
            x >= frame.x && x < frame.max_x() && y >= frame.y && y < frame.max_y()
        };
        self.chunks
            .iter()
            .filter(|chunk| contains(&chunk.bounds))
            .flat_map(|chunk| &self.frames[chunk.start..chunk.end])
            .find(|(_, frame)| contains(frame))
            .map(|(index, _)| *index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Single column of 10-point rows.
    fn rows(n: usize) -> Vec<PlacementRect> {
        (0..n)
            .map(|index| PlacementRect {
                index,
                frame: Frame::new(0.0, index as f64 * 10.0, 100.0, 10.0),
                column: 0,
                full_width: false,
            })
            .collect()
    }

    #[test]
    fn chunks_cover_all_placements() {
        let index = SpatialIndex::build(&rows(45), 20);
        assert_eq!(index.chunk_count(), 3);
    }

    #[test]
    fn query_returns_strict_overlaps() {
        let index = SpatialIndex::build(&rows(100), 20);
        // [250, 305) overlaps rows 25 through 30; row 24 only touches it.
        let hits = index.query(&Frame::new(0.0, 250.0, 100.0, 55.0));
        assert_eq!(hits, vec![25, 26, 27, 28, 29, 30]);
    }

    #[test]
    fn query_edge_touching_is_excluded() {
        let index = SpatialIndex::build(&rows(5), 2);
        let hits = index.query(&Frame::new(0.0, 20.0, 100.0, 10.0));
        assert_eq!(hits, vec![2]);
    }

    #[test]
    fn query_outside_is_empty() {
        let index = SpatialIndex::build(&rows(5), 20);
        assert!(index.query(&Frame::new(200.0, 0.0, 10.0, 10.0)).is_empty());
        assert!(SpatialIndex::default().query(&Frame::new(0.0, 0.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn hit_test_finds_containing_row() {
        let index = SpatialIndex::build(&rows(50), 20);
        assert_eq!(index.hit_test(5.0, 415.0), Some(41));
        assert_eq!(index.hit_test(5.0, 600.0), None);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let index = SpatialIndex::build(&rows(3), 0);
        assert_eq!(index.chunk_count(), 3);
    }
}
