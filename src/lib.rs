#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod canvas;
pub mod export;
pub mod geom;
pub mod transform;
pub use app::App;
pub use canvas::Canvas2D;
