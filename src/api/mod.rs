pub mod attendance;
pub mod scanner;
pub mod sheet;
