//! Click-to-sort state for the request table

use super::feed::RequestRow;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Stream order
    Order,
    Method,
    Status,
    Path,
    Host,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Order,
        Column::Method,
        Column::Status,
        Column::Path,
        Column::Host,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Column::Order => "#",
            Column::Method => "Method",
            Column::Status => "Status",
            Column::Path => "Path",
            Column::Host => "Host",
        }
    }

    /// Next column, wrapping around
    pub fn next(&self) -> Column {
        let idx = Column::ALL.iter().position(|c| c == self).unwrap_or(0);
        Column::ALL[(idx + 1) % Column::ALL.len()]
    }

    fn compare(&self, a: &RequestRow, b: &RequestRow) -> Ordering {
        match self {
            Column::Order => Ordering::Equal,
            Column::Method => a.method.cmp(&b.method),
            Column::Status => a.status.cmp(&b.status),
            Column::Path => a.path.cmp(&b.path),
            Column::Host => a.host.cmp(&b.host),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Ascending => "▲",
            Direction::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub direction: Direction,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: Column::Order,
            direction: Direction::Ascending,
        }
    }
}

impl SortState {
    /// Header click: same column flips direction, a new one starts ascending
    pub fn toggle(&mut self, column: Column) {
        if self.column == column {
            self.direction = match self.direction {
                Direction::Ascending => Direction::Descending,
                Direction::Descending => Direction::Ascending,
            };
        } else {
            self.column = column;
            self.direction = Direction::Ascending;
        }
    }

    /// Display order as indices into `rows`; ties keep stream order
    pub fn apply(&self, rows: &[RequestRow]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..rows.len()).collect();

        match (self.column, self.direction) {
            (Column::Order, Direction::Ascending) => {}
            (Column::Order, Direction::Descending) => order.reverse(),
            (column, direction) => order.sort_by(|&a, &b| {
                let ord = column.compare(&rows[a], &rows[b]);
                match direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            }),
        }

        order
    }
}
