//! Data-masking: the 8 candidate mask patterns, the 4 penalty rules, and
//! best-mask selection (ground truth:
//! `QrCode::apply_mask` / `QrCode::get_penalty_score` in
//! `nayuki-QR-Code-generator`).

use crate::level::EcLevel;
use crate::matrix::ModuleGrid;

/// Evaluates mask pattern `index` (`0..8`) at `(x, y)`: `true` means that
/// module's color is flipped.
fn mask_fn(index: u8, x: i32, y: i32) -> bool {
    match index {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => (x * y) % 2 + (x * y) % 3 == 0,
        6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        7 => ((x + y) % 2 + (x * y) % 3) % 2 == 0,
        _ => unreachable!("mask index out of range: {index}"),
    }
}

/// Tries all 8 masks against a grid that already has function patterns and
/// data placed, picks the one with the lowest total penalty score
/// (ties broken toward the lowest index), writes its format/version info,
/// and returns the winning index.
///
/// `grid` is mutated in place to end up holding the winning mask's state.
pub(crate) fn best_mask(grid: &mut ModuleGrid, level: EcLevel, version: u8) -> u8 {
    let mut best_index = 0u8;
    let mut best_penalty = i64::MAX;

    for candidate in 0..8u8 {
        grid.toggle_mask(|x, y| mask_fn(candidate, x, y));
        grid.write_format_info(level, candidate);
        grid.write_version_info(version);

        let penalty = total_penalty(grid);
        if penalty < best_penalty {
            best_penalty = penalty;
            best_index = candidate;
        }

        grid.toggle_mask(|x, y| mask_fn(candidate, x, y)); // undo before trying the next candidate
    }

    grid.toggle_mask(|x, y| mask_fn(best_index, x, y));
    grid.write_format_info(level, best_index);
    grid.write_version_info(version);
    best_index
}

fn total_penalty(grid: &ModuleGrid) -> i64 {
    rule1(grid) + rule2(grid) + rule3(grid) + rule4(grid)
}

/// Rule 1: runs of 5+ same-color modules in a row or column.
fn rule1(grid: &ModuleGrid) -> i64 {
    let size = grid.size() as i32;
    let mut penalty = 0i64;

    for y in 0..size {
        let mut run_len = 1;
        let mut prev = grid.is_dark(0, y);
        for x in 1..size {
            let cur = grid.is_dark(x, y);
            if cur == prev {
                run_len += 1;
            } else {
                if run_len >= 5 {
                    penalty += 3 + (run_len - 5) as i64;
                }
                run_len = 1;
                prev = cur;
            }
        }
        if run_len >= 5 {
            penalty += 3 + (run_len - 5) as i64;
        }
    }

    for x in 0..size {
        let mut run_len = 1;
        let mut prev = grid.is_dark(x, 0);
        for y in 1..size {
            let cur = grid.is_dark(x, y);
            if cur == prev {
                run_len += 1;
            } else {
                if run_len >= 5 {
                    penalty += 3 + (run_len - 5) as i64;
                }
                run_len = 1;
                prev = cur;
            }
        }
        if run_len >= 5 {
            penalty += 3 + (run_len - 5) as i64;
        }
    }

    penalty
}

/// Rule 2: 2x2 blocks of a single color, 3 points per block.
fn rule2(grid: &ModuleGrid) -> i64 {
    let size = grid.size() as i32;
    let mut penalty = 0i64;
    for y in 0..size - 1 {
        for x in 0..size - 1 {
            let c = grid.is_dark(x, y);
            if grid.is_dark(x + 1, y) == c
                && grid.is_dark(x, y + 1) == c
                && grid.is_dark(x + 1, y + 1) == c
            {
                penalty += 3;
            }
        }
    }
    penalty
}

const FINDER_LIKE: [bool; 11] = [
    true, false, true, true, true, false, true, false, false, false, false,
];

/// Rule 3: finder-like patterns (`1:1:3:1:1` ratio with 4 light modules on
/// one side), 40 points each.
fn rule3(grid: &ModuleGrid) -> i64 {
    let size = grid.size() as i32;
    let mut penalty = 0i64;

    for y in 0..size {
        for x in 0..=size - 11 {
            if (0..11).all(|i| grid.is_dark(x + i, y) == FINDER_LIKE[i as usize]) {
                penalty += 40;
            }
            if (0..11).all(|i| grid.is_dark(x + i, y) == FINDER_LIKE[10 - i as usize]) {
                penalty += 40;
            }
        }
    }
    for x in 0..size {
        for y in 0..=size - 11 {
            if (0..11).all(|i| grid.is_dark(x, y + i) == FINDER_LIKE[i as usize]) {
                penalty += 40;
            }
            if (0..11).all(|i| grid.is_dark(x, y + i) == FINDER_LIKE[10 - i as usize]) {
                penalty += 40;
            }
        }
    }
    penalty
}

/// Rule 4: overall dark/light balance, 10 points per 5% step away from 50%.
fn rule4(grid: &ModuleGrid) -> i64 {
    let dark = grid.dark_module_count() as i64;
    let total = grid.total_modules() as i64;
    let percent_dark = dark * 100 / total;
    let prev_mult = (percent_dark / 5) * 5;
    let a = (prev_mult as i64 - 50).abs() / 5;
    let b = (prev_mult as i64 + 5 - 50).abs() / 5;
    a.min(b) * 10
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mask_functions_are_deterministic_booleans() {
        for idx in 0..8u8 {
            let _ = mask_fn(idx, 3, 5);
        }
    }

    #[test]
    fn best_mask_picks_a_valid_index() {
        let mut grid = ModuleGrid::new(1);
        grid.draw_function_patterns(1);
        let data = vec![0xAAu8; 26];
        grid.place_data_bits(&data);
        let chosen = best_mask(&mut grid, EcLevel::Medium, 1);
        assert!(chosen < 8);
    }

    #[test]
    fn all_light_grid_has_large_rule1_and_rule2_penalty() {
        // Every row and column is one uninterrupted run of 21 light modules,
        // and every 2x2 block is uniformly light, so both rules fire hard.
        let grid = ModuleGrid::new(1);
        assert!(rule1(&grid) > 0);
        assert!(rule2(&grid) > 0);
    }
}
