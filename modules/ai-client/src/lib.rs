pub mod error;
pub mod perplexity;
pub mod structured;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use perplexity::Perplexity;
pub use structured::{generate_structured, parse_structured};
pub use traits::{GenerationOptions, TextGenerator};
pub use util::{json_object_span, strip_code_blocks, truncate_to_char_boundary};
