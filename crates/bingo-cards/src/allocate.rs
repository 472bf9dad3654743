//! Card allocation
//!
//! Every card gets its own uniformly random permutation of the image pool.
//! Images never repeat within a card (when the pool is large enough) but may
//! repeat across cards.

use crate::types::*;
use rand::Rng;

/// Index of the free-space cell, or `None` for even sizes
pub fn center_index(size: usize) -> Option<usize> {
    if size % 2 == 0 {
        None
    } else {
        Some(size * size / 2)
    }
}

/// Number of distinct images needed to fill one card of the given size
pub fn required_images_per_grid(size: usize) -> usize {
    let cells = size * size;
    if center_index(size).is_some() {
        cells - 1
    } else {
        cells
    }
}

/// Fisher-Yates shuffle in place
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}

/// Build the cells of a single card.
///
/// If the pool is smaller than [`required_images_per_grid`], images cycle
/// through the shuffled pool.
pub fn allocate_cells<R: Rng + ?Sized>(
    pool: &[BingoImage],
    size: usize,
    rng: &mut R,
) -> Result<Vec<Cell>> {
    let required = required_images_per_grid(size);
    if pool.is_empty() && required > 0 {
        return Err(BingoError::InsufficientImages {
            required,
            available: 0,
        });
    }

    let mut order: Vec<usize> = (0..pool.len()).collect();
    shuffle(&mut order, rng);

    let center = center_index(size);
    let mut cells = Vec::with_capacity(size * size);
    let mut next = 0;

    for index in 0..size * size {
        if Some(index) == center {
            cells.push(Cell::FreeSpace);
        } else {
            let image = &pool[order[next % order.len()]];
            cells.push(Cell::Image(image.id.clone()));
            next += 1;
        }
    }

    Ok(cells)
}

/// Allocate `card_count` independent cards named "Card 1", "Card 2", ...
pub fn allocate<R: Rng + ?Sized>(
    pool: &[BingoImage],
    size: usize,
    card_count: usize,
    rng: &mut R,
) -> Result<Vec<NewGrid>> {
    if pool.len() < required_images_per_grid(size) {
        log::warn!(
            "Pool of {} images is below the {} needed per card; images will repeat",
            pool.len(),
            required_images_per_grid(size)
        );
    }

    (0..card_count)
        .map(|i| {
            Ok(NewGrid {
                name: format!("Card {}", i + 1),
                cells: allocate_cells(pool, size, rng)?,
            })
        })
        .collect()
}
