pub mod gate;
pub mod screen;

pub use gate::SessionGate;
pub use screen::Screen;
