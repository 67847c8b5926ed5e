use std::fmt;
use std::str::FromStr;

use crate::errors::AppError;

/// The hosted AI functions this service relays to. Each maps to one path
/// segment under `AI_FUNCTIONS_URL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTarget {
    AnalyzeResume,
    MatchCandidates,
    CandidateChat,
    GenerateJobDescription,
    InterviewQuestions,
}

impl AiTarget {
    pub const ALL: [AiTarget; 5] = [
        AiTarget::AnalyzeResume,
        AiTarget::MatchCandidates,
        AiTarget::CandidateChat,
        AiTarget::GenerateJobDescription,
        AiTarget::InterviewQuestions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AiTarget::AnalyzeResume => "analyze-resume",
            AiTarget::MatchCandidates => "match-candidates",
            AiTarget::CandidateChat => "candidate-chat",
            AiTarget::GenerateJobDescription => "generate-job-description",
            AiTarget::InterviewQuestions => "interview-questions",
        }
    }
}

impl fmt::Display for AiTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AiTarget::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown AI target '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_every_target() {
        for target in AiTarget::ALL {
            assert_eq!(target.as_str().parse::<AiTarget>().unwrap(), target);
        }
    }

    #[test]
    fn test_rejects_unknown_and_path_like_names() {
        assert!("summarize".parse::<AiTarget>().is_err());
        assert!("../admin".parse::<AiTarget>().is_err());
        assert!("Analyze-Resume".parse::<AiTarget>().is_err());
    }
}
