use thiserror::Error;

/// Rejected input grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("grid must have 9 rows, found {0}")]
	RowCount(usize),
	#[error("row {row} has {len} cells, expected 9")]
	RowLength { row: usize, len: usize },
	#[error("cell ({row}, {col}) holds {value}, expected 0-9")]
	CellValue { row: usize, col: usize, value: i32 },
}

#[derive(Debug, Error)]
pub enum VisualizerError {
	#[error("invalid grid: {0}")]
	Validation(#[from] ValidationError),
	#[error("render surface unavailable: {0}")]
	Initialization(String),
}
