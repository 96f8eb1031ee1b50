pub mod lines;

pub use lines::{read_lines, Lines};
