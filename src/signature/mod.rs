pub mod matcher;
pub mod normalize;
pub mod registry;
pub mod rules;
pub mod types;

pub use matcher::{Mismatch, SignatureMatcher};
pub use registry::{Insertion, Registry, SignatureConflict};
pub use types::{ArgumentType, MessageSignature, ParameterSignature, TypeDescriptor};
