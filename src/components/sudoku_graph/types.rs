use super::error::ValidationError;

pub const GRID_SIZE: usize = 9;
pub const BOX_SIZE: usize = 3;
pub const VERTEX_COUNT: usize = GRID_SIZE * GRID_SIZE;
pub const MAX_VALUE: u8 = 9;

/// Dense vertex index of a cell, `row * 9 + col`.
pub fn cell_index(row: usize, col: usize) -> usize {
	row * GRID_SIZE + col
}

/// Row-major index of the 3×3 box containing a cell.
pub fn box_of(row: usize, col: usize) -> usize {
	(row / BOX_SIZE) * BOX_SIZE + col / BOX_SIZE
}

/// A validated 9×9 grid of digits, `0` meaning empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Board([[u8; GRID_SIZE]; GRID_SIZE]);

impl Board {
	/// Checks shape and range of caller-supplied rows. Nothing is kept on failure.
	pub fn from_rows<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self, ValidationError> {
		if rows.len() != GRID_SIZE {
			return Err(ValidationError::RowCount(rows.len()));
		}
		let mut cells = [[0u8; GRID_SIZE]; GRID_SIZE];
		for (row, values) in rows.iter().enumerate() {
			let values = values.as_ref();
			if values.len() != GRID_SIZE {
				return Err(ValidationError::RowLength {
					row,
					len: values.len(),
				});
			}
			for (col, &value) in values.iter().enumerate() {
				cells[row][col] = u8::try_from(value)
					.ok()
					.filter(|v| *v <= MAX_VALUE)
					.ok_or(ValidationError::CellValue { row, col, value })?;
			}
		}
		Ok(Self(cells))
	}

	pub fn get(&self, row: usize, col: usize) -> u8 {
		self.0[row][col]
	}

	pub fn set(&mut self, row: usize, col: usize, value: u8) {
		self.0[row][col] = value;
	}

	pub fn to_rows(&self) -> Vec<Vec<i32>> {
		self.0
			.iter()
			.map(|row| row.iter().map(|&v| i32::from(v)).collect())
			.collect()
	}
}

/// Connection category, in precedence order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeCategory {
	SameValue,
	SameRow,
	SameCol,
	SameBox,
}

/// Unordered vertex pair stored as `from < to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
	from: usize,
	to: usize,
}

impl EdgeKey {
	pub fn new(a: usize, b: usize) -> Self {
		debug_assert_ne!(a, b, "self-loops are never eligible");
		Self {
			from: a.min(b),
			to: a.max(b),
		}
	}

	pub fn from(&self) -> usize {
		self.from
	}

	pub fn to(&self) -> usize {
		self.to
	}

	pub fn touches(&self, index: usize) -> bool {
		self.from == index || self.to == index
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rows_with(row: usize, col: usize, value: i32) -> Vec<Vec<i32>> {
		let mut rows = vec![vec![0; GRID_SIZE]; GRID_SIZE];
		rows[row][col] = value;
		rows
	}

	#[test]
	fn edge_key_is_canonical() {
		assert_eq!(EdgeKey::new(12, 3), EdgeKey::new(3, 12));
		let key = EdgeKey::new(40, 7);
		assert_eq!((key.from(), key.to()), (7, 40));
		assert!(key.touches(40) && key.touches(7) && !key.touches(8));
	}

	#[test]
	fn box_index_follows_three_by_three_blocks() {
		assert_eq!(box_of(0, 0), 0);
		assert_eq!(box_of(2, 8), 2);
		assert_eq!(box_of(4, 4), 4);
		assert_eq!(box_of(8, 0), 6);
		assert_eq!(cell_index(8, 8), VERTEX_COUNT - 1);
	}

	#[test]
	fn rejects_wrong_row_count() {
		let rows = vec![vec![0; GRID_SIZE]; 8];
		assert_eq!(Board::from_rows(&rows), Err(ValidationError::RowCount(8)));
	}

	#[test]
	fn rejects_short_row() {
		let mut rows = vec![vec![0; GRID_SIZE]; GRID_SIZE];
		rows[4].pop();
		assert_eq!(
			Board::from_rows(&rows),
			Err(ValidationError::RowLength { row: 4, len: 8 })
		);
	}

	#[test]
	fn rejects_out_of_range_values() {
		assert_eq!(
			Board::from_rows(&rows_with(2, 3, 10)),
			Err(ValidationError::CellValue {
				row: 2,
				col: 3,
				value: 10
			})
		);
		assert!(Board::from_rows(&rows_with(0, 0, -1)).is_err());
	}

	#[test]
	fn accepts_valid_rows_and_round_trips_values() {
		let board = Board::from_rows(&rows_with(5, 6, 9)).unwrap();
		assert_eq!(board.get(5, 6), 9);
		assert_eq!(board.to_rows(), rows_with(5, 6, 9));
	}
}
