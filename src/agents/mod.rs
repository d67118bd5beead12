pub mod classification;
pub mod error;
pub mod ports;
pub mod prediction;
pub mod scorer;
pub mod testing;

pub use classification::ClassificationAgent;
pub use error::{AgentError, AgentErrorKind};
pub use ports::{CoFeatures, SmokeScorerPort};
pub use prediction::{PredictionAgent, extract_co_features};
pub use scorer::ThresholdScorer;
