pub mod cli;
pub mod json;
pub mod output;
pub mod path;
pub mod pattern;
pub mod source;
pub mod stage;
pub mod stream;
pub mod value;

pub use json::{json_to_value, value_to_json};
pub use output::{to_json, to_json_pretty};
pub use path::{Key, Step, MESSAGE};
pub use pattern::{Capture, CaptureType, Pattern, PatternError};
pub use source::{Source, SourceError};
pub use stage::{emit, Action};
pub use stream::Stream;
pub use value::Value;
