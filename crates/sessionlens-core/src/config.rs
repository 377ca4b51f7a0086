use serde::{Deserialize, Serialize};

use sessionlens_filters::{AnimationConfig, SimilarityConfig};

use crate::classifier::ClassifierConfig;

/// Settings for every stage of the reconstruction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub similarity: SimilarityConfig,
    pub animation: AnimationConfig,
    pub classifier: ClassifierConfig,
}
