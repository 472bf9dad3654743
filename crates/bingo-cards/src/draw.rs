//! Live draw sessions: random image reveal without replacement.

use crate::types::*;
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DrawSession {
    pub id: String,
    pub game_id: String,
    pub name: String,
    pub is_active: bool,
    /// Image ids in draw order
    pub drawn: Vec<String>,
}

impl DrawSession {
    pub fn new(id: impl Into<String>, game_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            game_id: game_id.into(),
            name: name.into(),
            is_active: true,
            drawn: Vec::new(),
        }
    }

    /// Images of `pool` not drawn yet, in pool order
    pub fn remaining<'a>(&self, pool: &'a [BingoImage]) -> Vec<&'a BingoImage> {
        pool.iter()
            .filter(|image| !self.drawn.contains(&image.id))
            .collect()
    }

    /// Draw one image uniformly among those not drawn yet.
    ///
    /// Returns `None` once the pool is exhausted.
    pub fn draw_next<R: Rng + ?Sized>(&mut self, pool: &[BingoImage], rng: &mut R) -> Option<String> {
        let remaining = self.remaining(pool);
        if remaining.is_empty() {
            return None;
        }

        let pick = remaining[rng.gen_range(0..remaining.len())].id.clone();
        self.drawn.push(pick.clone());
        Some(pick)
    }

    pub fn reset(&mut self) {
        self.drawn.clear();
    }
}

/// Whether any full row, column or diagonal of `grid` is covered by `drawn`.
///
/// The free-space cell always counts as covered.
pub fn is_winning_line(grid: &Grid, drawn: &[String]) -> bool {
    let size = grid.size();
    if size == 0 {
        return false;
    }

    let covered = |index: usize| match &grid.cells[index] {
        Cell::FreeSpace => true,
        Cell::Image(id) => drawn.contains(id),
    };

    let rows = (0..size).any(|r| (0..size).all(|c| covered(r * size + c)));
    let cols = (0..size).any(|c| (0..size).all(|r| covered(r * size + c)));
    let diagonal = (0..size).all(|i| covered(i * size + i));
    let anti_diagonal = (0..size).all(|i| covered(i * size + size - 1 - i));

    rows || cols || diagonal || anti_diagonal
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn pool(count: usize) -> Vec<BingoImage> {
        (0..count)
            .map(|i| BingoImage {
                id: format!("img-{}", i),
                game_id: "g".to_string(),
                name: format!("Photo {}", i),
                source: SourceRef::new(format!("{}.jpg", i)),
            })
            .collect()
    }

    fn grid_3x3() -> Grid {
        let mut cells: Vec<Cell> = (0..9).map(|i| Cell::Image(format!("img-{}", i))).collect();
        cells[4] = Cell::FreeSpace;
        Grid {
            id: "grid".to_string(),
            group_id: "group".to_string(),
            name: "Card 1".to_string(),
            cells,
        }
    }

    #[test]
    fn test_draw_without_replacement() {
        let images = pool(10);
        let mut session = DrawSession::new("s", "g", "Round 1");
        let mut rng = StdRng::seed_from_u64(11);

        let mut seen = HashSet::new();
        for _ in 0..10 {
            let id = session.draw_next(&images, &mut rng).unwrap();
            assert!(seen.insert(id));
        }
        assert_eq!(session.draw_next(&images, &mut rng), None);
        assert_eq!(session.drawn.len(), 10);
    }

    #[test]
    fn test_reset() {
        let images = pool(3);
        let mut session = DrawSession::new("s", "g", "Round 1");
        let mut rng = StdRng::seed_from_u64(12);
        session.draw_next(&images, &mut rng);
        session.reset();
        assert_eq!(session.remaining(&images).len(), 3);
    }

    #[test]
    fn test_winning_row() {
        let grid = grid_3x3();
        let drawn = vec!["img-0".to_string(), "img-1".to_string()];
        assert!(!is_winning_line(&grid, &drawn));

        let drawn = vec!["img-0".to_string(), "img-1".to_string(), "img-2".to_string()];
        assert!(is_winning_line(&grid, &drawn));
    }

    #[test]
    fn test_free_space_completes_diagonal() {
        let grid = grid_3x3();
        let drawn = vec!["img-0".to_string(), "img-8".to_string()];
        assert!(is_winning_line(&grid, &drawn));
    }

    #[test]
    fn test_free_space_completes_middle_column() {
        let grid = grid_3x3();
        let drawn = vec!["img-1".to_string(), "img-7".to_string()];
        assert!(is_winning_line(&grid, &drawn));
    }
}
