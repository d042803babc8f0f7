/// The fixed set of answer models offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnswerModel {
    /// Skips generation and answers with the best-matching chunk.
    FastRetrieval,
    #[default]
    SmartSynthesis,
    AdvancedReasoning,
}

impl AnswerModel {
    pub const ALL: [AnswerModel; 3] = [
        AnswerModel::FastRetrieval,
        AnswerModel::SmartSynthesis,
        AnswerModel::AdvancedReasoning,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::FastRetrieval => "MiniLM (fast retrieval)",
            Self::SmartSynthesis => "Phi3-mini (smart synthesis)",
            Self::AdvancedReasoning => "Gemma-2B (advanced reasoning)",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::FastRetrieval => "minilm",
            Self::SmartSynthesis => "phi3",
            Self::AdvancedReasoning => "gemma:2b",
        }
    }

    pub fn skips_generation(self) -> bool {
        self == Self::FastRetrieval
    }

    /// Resolve a display name, tag, or short alias. Unknown names fall back to
    /// [`AnswerModel::AdvancedReasoning`].
    pub fn resolve(name: &str) -> Self {
        let n = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| {
                m.display_name() == n
                    || m.tag().eq_ignore_ascii_case(n)
                    || m.alias().eq_ignore_ascii_case(n)
            })
            .unwrap_or(Self::AdvancedReasoning)
    }

    fn alias(self) -> &'static str {
        match self {
            Self::FastRetrieval => "fast",
            Self::SmartSynthesis => "smart",
            Self::AdvancedReasoning => "reasoning",
        }
    }
}
