//! Language model adapters implementing the answer oracle port.

mod openai;

pub use openai::OpenAiOracle;
