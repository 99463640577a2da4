pub mod contour;

pub use contour::{parse_contour, read_contour, write_contour};
