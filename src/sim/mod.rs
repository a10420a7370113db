pub mod board;
pub mod event;
pub mod level;
pub mod session;
pub mod step;
