//! HTML boundary: fragment parsing, serialization and code highlighting.

mod highlight;
mod parse;
mod serialize;

pub use highlight::highlight_code_blocks;
pub use parse::{parse_html, parse_node};
pub use serialize::{children_html, element_html, range_html, range_text, render_html};
