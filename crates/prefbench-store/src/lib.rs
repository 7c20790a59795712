pub mod results;
pub mod topics;

pub use results::{read_results, write_results};
pub use topics::{load_topics, parse_topics};
