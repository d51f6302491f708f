pub mod error;
pub mod floof;

pub use error::ApiError;

/// Routes served under `/floof`.
pub fn routes() -> Vec<rocket::Route> {
    routes![floof::get_top, floof::get_score, floof::refresh_score]
}
