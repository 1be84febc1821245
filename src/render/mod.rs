pub mod renderer;
pub mod surface;

pub use renderer::Renderer;
pub use surface::{Surface, View};
