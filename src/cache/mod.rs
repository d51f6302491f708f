pub mod floof;

pub use floof::{FloofMajestyStore, FloofScoreEntry};
