//! Generation profiles — fixed sampling parameter sets, one per call purpose.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::llm_client::LlmError;

/// Sampling parameters sent as `generationConfig` with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProfile {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

/// Call purpose. Selects one entry of the profile table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileKind {
    /// High temperature: question variety matters more than determinism.
    TestGeneration,
    /// Low temperature: evaluative output should be consistent.
    CandidateAnalysis,
    QuickResponse,
}

const TEST_GENERATION: GenerationProfile = GenerationProfile {
    temperature: 0.9,
    top_p: 0.95,
    top_k: 40,
    max_output_tokens: 8192,
};

const CANDIDATE_ANALYSIS: GenerationProfile = GenerationProfile {
    temperature: 0.4,
    top_p: 0.8,
    top_k: 20,
    max_output_tokens: 4096,
};

const QUICK_RESPONSE: GenerationProfile = GenerationProfile {
    temperature: 0.7,
    top_p: 0.9,
    top_k: 30,
    max_output_tokens: 2048,
};

impl ProfileKind {
    pub const fn profile(self) -> GenerationProfile {
        match self {
            ProfileKind::TestGeneration => TEST_GENERATION,
            ProfileKind::CandidateAnalysis => CANDIDATE_ANALYSIS,
            ProfileKind::QuickResponse => QUICK_RESPONSE,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ProfileKind::TestGeneration => "testGeneration",
            ProfileKind::CandidateAnalysis => "candidateAnalysis",
            ProfileKind::QuickResponse => "quickResponse",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testGeneration" => Ok(ProfileKind::TestGeneration),
            "candidateAnalysis" => Ok(ProfileKind::CandidateAnalysis),
            "quickResponse" => Ok(ProfileKind::QuickResponse),
            other => Err(LlmError::Configuration(format!(
                "unknown generation profile '{other}'"
            ))),
        }
    }
}
