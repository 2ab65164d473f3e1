pub mod constants;
pub mod controls;
pub mod frame;
pub mod scoreboard;
pub mod types;
pub mod viewer;
