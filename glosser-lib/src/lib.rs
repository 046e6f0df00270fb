pub mod types;
pub mod errors;
pub mod dictionary;
pub mod index;
pub mod inference;
pub mod disambiguate;
pub mod postedit;
pub mod evaluation;
pub mod pipeline;
pub mod output;

pub use dictionary::{Dictionary, HeldOut, Ingestor, SamplingConfig};
pub use errors::{GlossError, Result};
pub use evaluation::{evaluate, EvalSummary, FieldScore};
pub use index::{AffixIndex, GlossIndex, IndexConfig, Indices};
pub use inference::InferenceEngine;
pub use pipeline::{Pipeline, PipelineOptions};
pub use types::{Annotation, CandidateSet, Code, Columns, Prediction, Strategy};
