mod render;
pub mod sparkline;

pub use render::draw;
