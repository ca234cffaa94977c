pub mod classification;

pub use classification::{make_classification, Classification, ClassificationConfig};
