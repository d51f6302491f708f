pub mod floof;

pub use floof::{FloofFavouriteResponse, FloofScoreResponse};
