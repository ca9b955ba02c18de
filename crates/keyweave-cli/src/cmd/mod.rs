pub mod map;
pub mod names;
pub mod replay;
pub mod simulate;
