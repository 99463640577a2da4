pub mod clean;
pub mod consts;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod io;
pub mod ml;
pub mod ode;
pub mod optimize;
pub mod pipeline;
pub mod tensiometry;
pub mod young_laplace;
