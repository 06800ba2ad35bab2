mod extractor;
mod schema;

pub use extractor::{extract, DEFAULT_APPLICATION_WINDOW_DAYS};
pub use schema::{FeatureName, FeatureVector, UnknownFeature, FEATURE_COUNT};
