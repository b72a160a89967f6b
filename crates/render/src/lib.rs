pub mod camera;
pub mod html;
pub mod renderer;
pub mod svg;

pub use camera::{Camera, CameraError};
pub use html::render_html;
pub use renderer::{PathCommand, RenderFrame, Renderer, path_data};
pub use svg::render_svg;
