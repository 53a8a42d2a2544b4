//! Struct `Sample` represents a batch sample.

// Provides feature struct.
pub(crate) mod feature;
// Provides sample struct.
pub(crate) mod sample_struct;

// Provides structs that read a file.
pub(crate) mod reader;


pub use reader::{SampleReader, Table};
pub use sample_struct::Sample;
pub use feature::Feature;

pub(crate) use sample_struct::check_binary;
