pub mod matched_filter;
pub mod peak;
