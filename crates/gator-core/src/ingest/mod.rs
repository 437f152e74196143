mod pipeline;
mod pubdate;

pub use pipeline::{build_post, ingest, IngestReport};
pub use pubdate::{parse_pub_date, PubDateFormat, ACCEPTED_FORMATS};
