pub mod highlights;
pub mod mood;
pub mod performance;
pub mod query;
pub mod rating;
pub mod time_range;
