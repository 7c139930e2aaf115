use std::cell::RefCell;
use std::rc::Rc;

use leptos::ev::{Event, MouseEvent};
use leptos::prelude::*;

use crate::components::sudoku_graph::{
	DEFAULT_SPEED_MS, GRID_SIZE, MAX_SPEED_MS, MIN_SPEED_MS, SharedVisualizer, SudokuGraphCanvas,
};

const PUZZLE: [[i32; GRID_SIZE]; GRID_SIZE] = [
	[5, 3, 0, 0, 7, 0, 0, 0, 0],
	[6, 0, 0, 1, 9, 5, 0, 0, 0],
	[0, 9, 8, 0, 0, 0, 0, 6, 0],
	[8, 0, 0, 0, 6, 0, 0, 0, 3],
	[4, 0, 0, 8, 0, 3, 0, 0, 1],
	[7, 0, 0, 0, 2, 0, 0, 0, 6],
	[0, 6, 0, 0, 0, 0, 2, 8, 0],
	[0, 0, 0, 4, 1, 9, 0, 0, 5],
	[0, 0, 0, 0, 8, 0, 0, 7, 9],
];

const SOLUTION: [[i32; GRID_SIZE]; GRID_SIZE] = [
	[5, 3, 4, 6, 7, 8, 9, 1, 2],
	[6, 7, 2, 1, 9, 5, 3, 4, 8],
	[1, 9, 8, 3, 4, 2, 5, 6, 7],
	[8, 5, 9, 7, 6, 1, 4, 2, 3],
	[4, 2, 6, 8, 5, 3, 7, 9, 1],
	[7, 1, 3, 9, 2, 4, 8, 5, 6],
	[9, 6, 1, 5, 3, 7, 2, 8, 4],
	[2, 8, 7, 4, 1, 9, 6, 3, 5],
	[3, 4, 5, 2, 8, 6, 1, 7, 9],
];

fn puzzle_rows() -> Vec<Vec<i32>> {
	PUZZLE.iter().map(|row| row.to_vec()).collect()
}

/// First empty cell in reading order.
fn next_empty(board: &[Vec<i32>]) -> Option<(usize, usize)> {
	board.iter().enumerate().find_map(|(row, cells)| {
		cells.iter().position(|&v| v == 0).map(|col| (row, col))
	})
}

/// Visualizer page: a built-in puzzle solved one digit at a time.
#[component]
pub fn Home() -> impl IntoView {
	let visualizer: SharedVisualizer = Rc::new(RefCell::new(None));
	let board = RwSignal::new(puzzle_rows());
	let placed = RwSignal::new(Vec::<(usize, usize)>::new());
	let stats = RwSignal::new((0usize, 0usize));
	let last_move = RwSignal::new(String::from("-"));
	let speed = RwSignal::new(DEFAULT_SPEED_MS);
	let auto_rotate = RwSignal::new(true);

	let on_stats = Callback::new(move |(vertices, edges): (usize, usize)| {
		stats.set((vertices, edges));
	});

	let place_next = move |_: MouseEvent| {
		let Some((row, col)) = next_empty(&board.get_untracked()) else {
			last_move.set("solved".into());
			return;
		};
		let value = SOLUTION[row][col];
		board.update(|b| b[row][col] = value);
		placed.update(|p| p.push((row, col)));
		last_move.set(format!("({}, {}) = {value}", row + 1, col + 1));
	};

	let erase_last = move |_: MouseEvent| {
		let Some((row, col)) = placed.try_update(|p| p.pop()).flatten() else {
			return;
		};
		board.update(|b| b[row][col] = 0);
		last_move.set(format!("({}, {}) erased", row + 1, col + 1));
	};

	let reload = move |_: MouseEvent| {
		board.set(puzzle_rows());
		placed.update(Vec::clear);
		last_move.set("puzzle reloaded".into());
	};

	let viz_reset = visualizer.clone();
	let reset = move |_: MouseEvent| {
		if let Some(ref mut viz) = *viz_reset.borrow_mut() {
			if let Err(err) = viz.initialize(&board.get_untracked()) {
				last_move.set(err.to_string());
			}
		}
	};

	let viz_clear = visualizer.clone();
	let clear = move |_: MouseEvent| {
		if let Some(ref mut viz) = *viz_clear.borrow_mut() {
			viz.clear();
		}
	};

	let viz_rotate = visualizer.clone();
	let toggle_rotate = move |_: MouseEvent| {
		if let Some(ref mut viz) = *viz_rotate.borrow_mut() {
			auto_rotate.set(viz.toggle_auto_rotate());
		}
	};

	let viz_speed = visualizer.clone();
	let on_speed = move |ev: Event| {
		let Ok(ms) = event_target_value(&ev).parse::<u32>() else {
			return;
		};
		if let Some(ref mut viz) = *viz_speed.borrow_mut() {
			viz.set_animation_speed(ms);
			speed.set(viz.animation_speed());
		}
	};

	view! {
		<div class="fullscreen-graph">
			<SudokuGraphCanvas
				visualizer=visualizer
				board=board
				on_stats=on_stats
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Sudoku Constraint Graph"</h1>
				<p class="subtitle">"Drag to orbit. Scroll to zoom."</p>
				<div class="controls">
					<button on:click=place_next>"Place next digit"</button>
					<button on:click=erase_last>"Erase last"</button>
					<button on:click=reload>"Reload puzzle"</button>
					<button on:click=reset>"Reset graph"</button>
					<button on:click=clear>"Clear graph"</button>
					<button on:click=toggle_rotate>
						{move || if auto_rotate.get() { "Stop rotation" } else { "Auto-rotate" }}
					</button>
				</div>
				<label class="speed">
					"Speed "
					<input
						type="range"
						min=MIN_SPEED_MS.to_string()
						max=MAX_SPEED_MS.to_string()
						step="50"
						prop:value=move || speed.get().to_string()
						on:input=on_speed
					/>
					{move || format!(" {} ms", speed.get())}
				</label>
				<p class="stats">
					{move || {
						let (vertices, edges) = stats.get();
						format!("{vertices} vertices, {edges} edges")
					}}
				</p>
				<p class="last-move">"Last move: " {move || last_move.get()}</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sudoku_graph::Board;

	#[test]
	fn built_in_puzzle_and_solution_agree() {
		let puzzle = Board::from_rows(&PUZZLE).unwrap();
		let solution = Board::from_rows(&SOLUTION).unwrap();
		assert!(solution.to_rows().iter().flatten().all(|&v| v != 0));
		for row in 0..GRID_SIZE {
			for col in 0..GRID_SIZE {
				let given = puzzle.get(row, col);
				assert!(given == 0 || given == solution.get(row, col));
			}
		}
	}

	#[test]
	fn next_empty_scans_in_reading_order() {
		let mut rows = puzzle_rows();
		assert_eq!(next_empty(&rows), Some((0, 2)));
		rows[0][2] = 4;
		assert_eq!(next_empty(&rows), Some((0, 3)));
		let solved: Vec<Vec<i32>> = SOLUTION.iter().map(|r| r.to_vec()).collect();
		assert_eq!(next_empty(&solved), None);
	}
}
