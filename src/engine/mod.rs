// Engine modules: renderer, physics, input, audio, frame timing

pub mod audio;
pub mod game_loop;
pub mod input;
pub mod physics;
pub mod renderer;
