// Path Planning algorithms module

pub mod a_star;
pub mod rrt;
pub mod catmull_rom;

pub use a_star::*;
pub use rrt::*;
pub use catmull_rom::*;
