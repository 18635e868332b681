pub mod interactive;
pub mod play;
pub mod search;
pub mod status;
