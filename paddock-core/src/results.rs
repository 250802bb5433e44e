//! Classification tables.

use serde::{Deserialize, Serialize};

use crate::ResultRow;

/// Session classification in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

/// Places gained or lost between the grid and the flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionChange {
    pub driver: String,
    pub grid_position: u32,
    pub finish_position: u32,
    /// Positive when places were gained.
    pub delta: i64,
}

impl ResultTable {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRow> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row for one competitor code.
    pub fn competitor(&self, driver: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|row| row.driver == driver)
    }

    pub fn winner(&self) -> Option<&ResultRow> {
        self.rows.iter().find(|row| row.finish_position == Some(1))
    }

    /// Classified top three in finishing order.
    pub fn podium(&self) -> Vec<&ResultRow> {
        let mut podium: Vec<&ResultRow> = self
            .rows
            .iter()
            .filter(|row| matches!(row.finish_position, Some(1..=3)))
            .collect();
        podium.sort_by_key(|row| row.finish_position);
        podium
    }

    /// Grid-to-finish change for every competitor with both positions known.
    ///
    /// A grid position of 0 (pit-lane start) is treated as unknown.
    pub fn position_changes(&self) -> Vec<PositionChange> {
        self.rows
            .iter()
            .filter_map(|row| {
                let grid = row.grid_position.filter(|g| *g > 0)?;
                let finish = row.finish_position?;
                Some(PositionChange {
                    driver: row.driver.clone(),
                    grid_position: grid,
                    finish_position: finish,
                    delta: i64::from(grid) - i64::from(finish),
                })
            })
            .collect()
    }
}

impl From<Vec<ResultRow>> for ResultTable {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self::new(rows)
    }
}

impl<'a> IntoIterator for &'a ResultTable {
    type Item = &'a ResultRow;
    type IntoIter = std::slice::Iter<'a, ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(driver: &str, grid: Option<u32>, finish: Option<u32>) -> ResultRow {
        ResultRow {
            driver: driver.to_string(),
            team: None,
            driver_number: None,
            grid_position: grid,
            finish_position: finish,
        }
    }

    fn table() -> ResultTable {
        ResultTable::new(vec![
            row("NOR", Some(1), Some(2)),
            row("PIA", Some(5), Some(3)),
            row("VER", Some(3), Some(1)),
            row("HUL", Some(0), Some(11)),
            row("ALB", Some(12), None),
        ])
    }

    #[test]
    fn test_winner_and_podium() {
        let table = table();
        assert_eq!(table.winner().map(|r| r.driver.as_str()), Some("VER"));
        let podium: Vec<&str> = table.podium().iter().map(|r| r.driver.as_str()).collect();
        assert_eq!(podium, vec!["VER", "NOR", "PIA"]);
    }

    #[test]
    fn test_position_changes_skip_unknown_positions() {
        let changes = table().position_changes();
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].delta, -1);
        assert_eq!(changes[1].delta, 2);
        assert_eq!(changes[2].driver, "VER");
        assert_eq!(changes[2].delta, 2);
    }

    #[test]
    fn test_competitor_lookup() {
        let table = table();
        assert!(table.competitor("ALB").is_some());
        assert!(table.competitor("XXX").is_none());
        assert!(ResultTable::default().winner().is_none());
    }
}
