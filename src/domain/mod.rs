pub mod rng;
pub mod rules;
pub mod word;
pub mod wordbank;
