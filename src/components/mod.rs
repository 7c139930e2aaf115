pub mod sudoku_graph;
