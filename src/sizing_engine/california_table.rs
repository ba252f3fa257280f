//! California Method lookup table
//!
//! Stream top width (rows, 0.1 m steps from 0.1 to 5.0) against average
//! depth (columns, 0.05 m steps from 0.05 to 0.50) gives the minimum
//! culvert diameter. Cells beyond standard sizing hold
//! `TableCell::ProfessionalDesignRequired` (a Q100 design is needed).
//!
//! Keys are integer-scaled: width in decimetres, depth in centimetres.
//!
//! ## Lookup policy
//!
//! - width below the first row clamps to it; above the last row is out of table
//! - depth below the first column clamps to it; above the last column is out of table
//! - otherwise width rounds to the nearest 0.1 m and depth to the nearest 0.05 m
//! - a missing row or column resolves to the next larger key, never a smaller one;
//!   past the last key the largest key is used

use std::collections::BTreeMap;

use crate::config::ConfigError;
use crate::types::TableCell;

const P: TableCell = TableCell::ProfessionalDesignRequired;

const fn mm(size: u32) -> TableCell {
    TableCell::Sized(size)
}

/// Depth columns of the built-in table (cm).
const DEPTH_COLUMNS_CM: [u16; 10] = [5, 10, 15, 20, 25, 30, 35, 40, 45, 50];

/// Built-in rows: (top width in dm, one cell per depth column).
#[rustfmt::skip]
const STANDARD_ROWS: [(u16, [TableCell; 10]); 50] = [
    (1, [mm(300), mm(300), mm(300), mm(300), mm(400), mm(400), mm(400), mm(400), mm(500), mm(500)]),
    (2, [mm(300), mm(300), mm(400), mm(400), mm(500), mm(500), mm(600), mm(600), mm(600), mm(700)]),
    (3, [mm(300), mm(400), mm(500), mm(500), mm(600), mm(600), mm(700), mm(700), mm(800), mm(800)]),
    (4, [mm(300), mm(400), mm(500), mm(600), mm(700), mm(700), mm(800), mm(800), mm(900), mm(900)]),
    (5, [mm(400), mm(500), mm(600), mm(700), mm(700), mm(800), mm(900), mm(900), mm(1000), mm(1000)]),
    (6, [mm(400), mm(500), mm(600), mm(700), mm(800), mm(900), mm(900), mm(1000), mm(1200), mm(1200)]),
    (7, [mm(400), mm(600), mm(700), mm(800), mm(900), mm(900), mm(1000), mm(1200), mm(1200), mm(1200)]),
    (8, [mm(400), mm(600), mm(700), mm(800), mm(900), mm(1000), mm(1200), mm(1200), mm(1200), mm(1400)]),
    (9, [mm(500), mm(600), mm(800), mm(900), mm(1000), mm(1200), mm(1200), mm(1200), mm(1400), mm(1400)]),
    (10, [mm(500), mm(700), mm(800), mm(900), mm(1000), mm(1200), mm(1200), mm(1400), mm(1400), mm(1400)]),
    (11, [mm(500), mm(700), mm(800), mm(1000), mm(1200), mm(1200), mm(1400), mm(1400), mm(1400), mm(1500)]),
    (12, [mm(500), mm(700), mm(900), mm(1000), mm(1200), mm(1200), mm(1400), mm(1400), mm(1500), mm(1600)]),
    (13, [mm(500), mm(800), mm(900), mm(1000), mm(1200), mm(1400), mm(1400), mm(1500), mm(1500), mm(1600)]),
    (14, [mm(600), mm(800), mm(900), mm(1200), mm(1200), mm(1400), mm(1400), mm(1500), mm(1600), mm(1800)]),
    (15, [mm(600), mm(800), mm(1000), mm(1200), mm(1200), mm(1400), mm(1500), mm(1600), mm(1800), mm(1800)]),
    (16, [mm(600), mm(800), mm(1000), mm(1200), mm(1400), mm(1400), mm(1500), mm(1600), mm(1800), mm(1800)]),
    (17, [mm(600), mm(900), mm(1000), mm(1200), mm(1400), mm(1400), mm(1600), mm(1800), mm(1800), mm(1900)]),
    (18, [mm(600), mm(900), mm(1200), mm(1200), mm(1400), mm(1500), mm(1600), mm(1800), mm(1800), mm(1900)]),
    (19, [mm(700), mm(900), mm(1200), mm(1400), mm(1400), mm(1500), mm(1600), mm(1800), mm(1900), mm(2000)]),
    (20, [mm(700), mm(900), mm(1200), mm(1400), mm(1400), mm(1600), mm(1800), mm(1800), mm(1900), mm(2000)]),
    (21, [mm(700), mm(900), mm(1200), mm(1400), mm(1500), mm(1600), mm(1800), mm(1800), mm(1900), P]),
    (22, [mm(700), mm(1000), mm(1200), mm(1400), mm(1500), mm(1600), mm(1800), mm(1900), mm(2000), P]),
    (23, [mm(700), mm(1000), mm(1200), mm(1400), mm(1500), mm(1800), mm(1800), mm(1900), mm(2000), P]),
    (24, [mm(700), mm(1000), mm(1200), mm(1400), mm(1600), mm(1800), mm(1800), mm(2000), P, P]),
    (25, [mm(700), mm(1000), mm(1200), mm(1400), mm(1600), mm(1800), mm(1900), mm(2000), P, P]),
    (26, [mm(800), mm(1000), mm(1400), mm(1500), mm(1600), mm(1800), mm(1900), mm(2000), P, P]),
    (27, [mm(800), mm(1200), mm(1400), mm(1500), mm(1800), mm(1800), mm(1900), P, P, P]),
    (28, [mm(800), mm(1200), mm(1400), mm(1500), mm(1800), mm(1800), mm(2000), P, P, P]),
    (29, [mm(800), mm(1200), mm(1400), mm(1500), mm(1800), mm(1900), mm(2000), P, P, P]),
    (30, [mm(800), mm(1200), mm(1400), mm(1600), mm(1800), mm(1900), P, P, P, P]),
    (31, [mm(800), mm(1200), mm(1400), mm(1600), mm(1800), mm(1900), P, P, P, P]),
    (32, [mm(800), mm(1200), mm(1400), mm(1600), mm(1800), mm(2000), P, P, P, P]),
    (33, [mm(800), mm(1200), mm(1400), mm(1600), mm(1800), mm(2000), P, P, P, P]),
    (34, [mm(900), mm(1200), mm(1400), mm(1800), mm(1900), mm(2000), P, P, P, P]),
    (35, [mm(900), mm(1200), mm(1500), mm(1800), mm(1900), P, P, P, P, P]),
    (36, [mm(900), mm(1200), mm(1500), mm(1800), mm(1900), P, P, P, P, P]),
    (37, [mm(900), mm(1200), mm(1500), mm(1800), mm(1900), P, P, P, P, P]),
    (38, [mm(900), mm(1400), mm(1500), mm(1800), mm(2000), P, P, P, P, P]),
    (39, [mm(900), mm(1400), mm(1500), mm(1800), mm(2000), P, P, P, P, P]),
    (40, [mm(900), mm(1400), mm(1600), mm(1800), mm(2000), P, P, P, P, P]),
    (41, [mm(900), mm(1400), mm(1600), mm(1800), mm(2000), P, P, P, P, P]),
    (42, [mm(900), mm(1400), mm(1600), mm(1800), P, P, P, P, P, P]),
    (43, [mm(1000), mm(1400), mm(1600), mm(1900), P, P, P, P, P, P]),
    (44, [mm(1000), mm(1400), mm(1600), mm(1900), P, P, P, P, P, P]),
    (45, [mm(1000), mm(1400), mm(1800), mm(1900), P, P, P, P, P, P]),
    (46, [mm(1000), mm(1400), mm(1800), mm(1900), P, P, P, P, P, P]),
    (47, [mm(1000), mm(1400), mm(1800), mm(1900), P, P, P, P, P, P]),
    (48, [mm(1000), mm(1400), mm(1800), mm(2000), P, P, P, P, P, P]),
    (49, [mm(1000), mm(1400), mm(1800), mm(2000), P, P, P, P, P, P]),
    (50, [mm(1000), mm(1400), mm(1800), mm(2000), P, P, P, P, P, P]),
];

/// California Method table with sparse-tolerant, round-up lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CaliforniaTable {
    rows: BTreeMap<u16, BTreeMap<u16, TableCell>>,
    min_width_dm: u16,
    max_width_dm: u16,
    min_depth_cm: u16,
    max_depth_cm: u16,
}

impl CaliforniaTable {
    /// The built-in field table.
    pub fn standard() -> Self {
        let rows = STANDARD_ROWS
            .iter()
            .map(|(width_dm, cells)| {
                let row = DEPTH_COLUMNS_CM.iter().copied().zip(cells.iter().copied()).collect();
                (*width_dm, row)
            })
            .collect();
        Self::from_map(rows)
    }

    /// Build a table from (width_dm, [(depth_cm, cell)]) rows. Rows may be
    /// sparse; empty rows are dropped. At least one cell is required.
    pub fn from_rows<I>(rows: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (u16, Vec<(u16, TableCell)>)>,
    {
        let map: BTreeMap<u16, BTreeMap<u16, TableCell>> = rows
            .into_iter()
            .filter(|(_, cells)| !cells.is_empty())
            .map(|(width_dm, cells)| (width_dm, cells.into_iter().collect()))
            .collect();
        if map.is_empty() {
            return Err(ConfigError::Validation(vec![
                "California table must contain at least one cell".to_string(),
            ]));
        }
        Ok(Self::from_map(map))
    }

    fn from_map(rows: BTreeMap<u16, BTreeMap<u16, TableCell>>) -> Self {
        let min_width_dm = rows.keys().next().copied().unwrap_or(0);
        let max_width_dm = rows.keys().next_back().copied().unwrap_or(0);
        let depth_keys = rows.values().flat_map(|row| row.keys().copied());
        let (min_depth_cm, max_depth_cm) = depth_keys
            .fold((u16::MAX, 0), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Self {
            rows,
            min_width_dm,
            max_width_dm,
            min_depth_cm,
            max_depth_cm,
        }
    }

    /// Largest tabulated top width (m).
    pub fn max_width_m(&self) -> f64 {
        f64::from(self.max_width_dm) / 10.0
    }

    /// Largest tabulated depth (m).
    pub fn max_depth_m(&self) -> f64 {
        f64::from(self.max_depth_cm) / 100.0
    }

    /// Minimum culvert size for an average top width and depth (both m).
    pub fn lookup(&self, width_m: f64, depth_m: f64) -> TableCell {
        if width_m > self.max_width_m() || depth_m > self.max_depth_m() {
            return P;
        }

        let width_dm = if width_m < f64::from(self.min_width_dm) / 10.0 {
            self.min_width_dm
        } else {
            round_to_step(width_m, 10.0, 1)
        };
        let depth_cm = if depth_m < f64::from(self.min_depth_cm) / 100.0 {
            self.min_depth_cm
        } else {
            round_to_step(depth_m, 20.0, 5)
        };

        let Some(row) = self.resolve_row(width_dm) else {
            return P;
        };
        resolve_cell(row, depth_cm).unwrap_or(P)
    }

    /// Exact row, else the next wider row, else the widest row.
    fn resolve_row(&self, width_dm: u16) -> Option<&BTreeMap<u16, TableCell>> {
        self.rows
            .get(&width_dm)
            .or_else(|| self.rows.range(width_dm..).next().map(|(_, row)| row))
            .or_else(|| self.rows.values().next_back())
    }

    /// Cell at an exact key (dm, cm) without any rounding.
    pub fn cell(&self, width_dm: u16, depth_cm: u16) -> Option<TableCell> {
        self.rows.get(&width_dm)?.get(&depth_cm).copied()
    }
}

impl Default for CaliforniaTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Exact column, else the next deeper column, else the deepest column.
fn resolve_cell(row: &BTreeMap<u16, TableCell>, depth_cm: u16) -> Option<TableCell> {
    row.get(&depth_cm)
        .or_else(|| row.range(depth_cm..).next().map(|(_, cell)| cell))
        .or_else(|| row.values().next_back())
        .copied()
}

/// Tolerance for representation error at half-step readings.
const HALF_STEP_BIAS: f64 = 1e-9;

/// Round `value` to the nearest grid step, where `steps_per_unit` steps
/// make one metre. Half steps round up. Returned in integer key units where
/// one step equals `units_per_step`.
fn round_to_step(value: f64, steps_per_unit: f64, units_per_step: u16) -> u16 {
    let steps = (value * steps_per_unit + HALF_STEP_BIAS).round();
    // Callers bound value to the table domain, so steps fits comfortably
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = steps.max(0.0) as u16;
    steps.saturating_mul(units_per_step)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_shape() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.rows.len(), 50);
        assert!(table.rows.values().all(|r| r.len() == 10));
        assert!((table.max_width_m() - 5.0).abs() < 1e-12);
        assert!((table.max_depth_m() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reference_cell() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.lookup(1.0, 0.20), TableCell::Sized(900));
        assert_eq!(table.cell(10, 20), Some(TableCell::Sized(900)));
    }

    #[test]
    fn test_width_above_table_requires_professional_design() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.lookup(5.5, 0.2), P);
        assert_eq!(table.lookup(5.01, 0.05), P);
    }

    #[test]
    fn test_depth_above_table_requires_professional_design() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.lookup(1.0, 0.55), P);
    }

    #[test]
    fn test_small_inputs_clamp_to_first_row_and_column() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.lookup(0.02, 0.01), table.lookup(0.1, 0.05));
        assert_eq!(table.lookup(0.04, 0.2), table.lookup(0.1, 0.2));
        assert_eq!(table.lookup(2.0, 0.001), table.lookup(2.0, 0.05));
    }

    #[test]
    fn test_rounds_to_nearest_key() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.lookup(1.04, 0.21), table.lookup(1.0, 0.20));
        assert_eq!(table.lookup(1.06, 0.23), table.lookup(1.1, 0.25));
    }

    #[test]
    fn test_half_step_readings_round_up() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.lookup(1.0, 0.175), table.lookup(1.0, 0.20));
        assert_eq!(table.lookup(1.0, 0.175), TableCell::Sized(900));
        assert_eq!(table.lookup(0.15, 0.2), table.lookup(0.2, 0.2));
        assert_eq!(table.lookup(1.15, 0.2), table.lookup(1.2, 0.2));
        assert_eq!(table.lookup(2.05, 0.2), table.lookup(2.1, 0.2));
        assert_eq!(table.lookup(1.0, 0.075), table.lookup(1.0, 0.10));
        assert_eq!(table.lookup(1.0, 0.475), table.lookup(1.0, 0.50));
    }

    #[test]
    fn test_every_half_step_uses_upper_key() {
        let table = CaliforniaTable::standard();
        for k in 1..50u16 {
            let width = f64::from(k) / 10.0 + 0.05;
            assert_eq!(
                table.lookup(width, 0.2),
                table.cell(k + 1, 20).unwrap_or(P),
                "width {width}"
            );
        }
        for k in 1..10u16 {
            let depth = f64::from(k) * 0.05 + 0.025;
            assert_eq!(
                table.lookup(1.0, depth),
                table.cell(10, (k + 1) * 5).unwrap_or(P),
                "depth {depth}"
            );
        }
    }

    #[test]
    fn test_sentinel_cells_propagate() {
        let table = CaliforniaTable::standard();
        assert_eq!(table.lookup(5.0, 0.5), P);
        assert_eq!(table.lookup(5.0, 0.05), TableCell::Sized(1000));
    }

    #[test]
    fn test_sparse_row_rounds_depth_up_never_down() {
        let table = CaliforniaTable::from_rows(vec![
            (10, vec![(10, mm(600)), (30, mm(1000))]),
        ])
        .unwrap();
        // 0.20 is not tabulated; next deeper column is 0.30
        assert_eq!(table.lookup(1.0, 0.20), TableCell::Sized(1000));
        assert_eq!(table.lookup(1.0, 0.10), TableCell::Sized(600));
    }

    #[test]
    fn test_sparse_row_past_last_depth_uses_row_maximum() {
        let table = CaliforniaTable::from_rows(vec![
            (10, vec![(10, mm(600)), (20, mm(800))]),
            (20, vec![(10, mm(700)), (40, mm(1200))]),
        ])
        .unwrap();
        // Row 1.0 stops at 0.20 while the table domain reaches 0.40
        assert_eq!(table.lookup(1.0, 0.35), TableCell::Sized(800));
    }

    #[test]
    fn test_missing_row_rounds_width_up() {
        let table = CaliforniaTable::from_rows(vec![
            (10, vec![(20, mm(800))]),
            (30, vec![(20, mm(1400))]),
        ])
        .unwrap();
        // 2.0 m has no row; the next wider row (3.0 m) is used
        assert_eq!(table.lookup(2.0, 0.2), TableCell::Sized(1400));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(CaliforniaTable::from_rows(Vec::new()).is_err());
        assert!(CaliforniaTable::from_rows(vec![(10, Vec::new())]).is_err());
    }

    #[test]
    fn test_never_below_rounded_down_neighbour() {
        let table = CaliforniaTable::standard();
        for w in 1..=50u16 {
            for d in 1..=10u16 {
                // Sample inside each cell, between grid points
                let width = f64::from(w) / 10.0 - 0.03;
                let depth = f64::from(d) * 0.05 - 0.012;
                let floor_w = ((width * 10.0).floor() as u16).max(1);
                let floor_d = (((depth * 20.0).floor() as u16) * 5).max(5);
                let found = table.lookup(width, depth);
                let floor = table.cell(floor_w, floor_d).unwrap_or(P);
                match (found.size(), floor.size()) {
                    (Some(f), Some(lo)) => assert!(f >= lo, "({width},{depth}) {f} < {lo}"),
                    (Some(_), None) => panic!("({width},{depth}) sized below a sentinel cell"),
                    _ => {}
                }
            }
        }

        // Half-step readings must reach at least the rounded-up cell
        let rank = |c: TableCell| c.size().unwrap_or(u32::MAX);
        for w in 1..50u16 {
            for d in 1..10u16 {
                let width = f64::from(w) / 10.0 + 0.05;
                let depth = f64::from(d) * 0.05 + 0.025;
                let found = table.lookup(width, depth);
                let upper = table.cell(w + 1, (d + 1) * 5).unwrap_or(P);
                assert!(
                    rank(found) >= rank(upper),
                    "({width},{depth}) {found:?} < {upper:?}"
                );
            }
        }
    }

    #[test]
    fn test_table_is_monotonic() {
        let table = CaliforniaTable::standard();
        let rank = |c: TableCell| c.size().unwrap_or(u32::MAX);
        for w in 1..=50u16 {
            for (i, &d) in DEPTH_COLUMNS_CM.iter().enumerate() {
                let here = rank(table.cell(w, d).unwrap());
                if i + 1 < DEPTH_COLUMNS_CM.len() {
                    assert!(rank(table.cell(w, DEPTH_COLUMNS_CM[i + 1]).unwrap()) >= here);
                }
                if w < 50 {
                    assert!(rank(table.cell(w + 1, d).unwrap()) >= here);
                }
            }
        }
    }
}
