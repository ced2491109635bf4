pub mod event;
pub mod falling;
pub mod prompt;
pub mod score;
pub mod session;
pub mod step;
pub mod world;
