//! Serialization: escaping, folding and whole-tree output.

mod escape;
mod fold;
mod serializer;

pub use escape::{
    escape_param_value, escape_text, split_unescaped, unescape_param_value, unescape_text,
};
pub use fold::{fold_line, unfold};
pub use serializer::{SerializeOptions, serialize, serialize_line};
