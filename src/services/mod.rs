pub mod content;
pub mod deviation;
pub mod engine;
pub mod predictor;
pub mod rating_store;
pub mod recommender;

pub use content::{category_coverage, ContentScorer, InterestSource};
pub use deviation::{Deviation, DeviationMatrix};
pub use engine::Engine;
pub use predictor::{Prediction, Predictor};
pub use rating_store::{Rating, RatingStore};
pub use recommender::Recommender;
