pub mod csv_serializer;
pub mod mid_matcher;

pub use csv_serializer::serialize;
pub use mid_matcher::MidMatcher;
