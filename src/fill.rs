//! Enclosure detection and capture.
//!
//! After a cell turns to team T, each orthogonal neighbor that is not T seeds
//! a breadth-first search over non-T cells. If the search reaches the grid's
//! outer ring the region is open and nothing happens; otherwise every cell it
//! visited is enclosed by T and gets claimed.

use std::collections::VecDeque;

use crate::grid::{Grid, Team};

/// Claim every region enclosed by `team` next to `idx`.
///
/// Returns the number of cells that changed hands. Cells under a player
/// marker are left alone even inside a captured region.
pub fn enclose(grid: &mut Grid, idx: usize, team: Team) -> usize {
    let occupation = team.occupation();
    let seeds: Vec<usize> = grid
        .neighbors(idx)
        .filter(|&n| grid.at(n) != occupation)
        .collect();

    let mut claimed = 0;
    for seed in seeds {
        // an earlier seed may already have absorbed this one
        if grid.at(seed) == occupation {
            continue;
        }
        if let Some(region) = enclosed_region(grid, seed, team) {
            for cell in region {
                if !grid.has_marker(cell) && grid.claim(cell, occupation) {
                    claimed += 1;
                }
            }
        }
    }
    if claimed > 0 {
        log::info!("{team} enclosed {claimed} cells");
    }
    claimed
}

/// Collect the non-`team` region containing `seed`, or `None` if it touches
/// the edge of the grid.
pub fn enclosed_region(grid: &Grid, seed: usize, team: Team) -> Option<Vec<usize>> {
    let occupation = team.occupation();
    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::from([seed]);
    let mut region = Vec::new();
    visited[seed] = true;

    while let Some(cell) = queue.pop_front() {
        if grid.at(cell) == occupation {
            continue;
        }
        if grid.is_edge(cell) {
            return None;
        }
        region.push(cell);
        for n in grid.neighbors(cell) {
            if !visited[n] {
                visited[n] = true;
                queue.push_back(n);
            }
        }
    }
    Some(region)
}
