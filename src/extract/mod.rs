//! HTML metadata extraction
//!
//! - `structured`: JSON-LD, Microdata and heuristic patterns
//! - `opengraph`: OpenGraph / Twitter card / `<title>` metadata

mod opengraph;
mod structured;

pub use opengraph::{parse_opengraph, OpenGraphData};
pub use structured::{
    extract_json_ld, extract_microdata, extract_patterns, extract_structured_data,
    get_best_schema, Schema, StructuredData,
};
