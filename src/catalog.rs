use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE: &str = "中文 (Chinese)";

/// Suggested output languages, in the order the selector lists them.
/// The language field itself accepts any text.
pub const LANGUAGES: [&str; 8] = [
    DEFAULT_LANGUAGE,
    "English (英文)",
    "Japanese (日语)",
    "Korean (韩语)",
    "Spanish (西班牙语)",
    "French (法语)",
    "German (德语)",
    "Russian (俄语)",
];

/// Model the rewritten prompt is meant for. Serialized by its raw value,
/// which is also what the rewrite request names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetModel {
    #[serde(rename = "Google Gemini 3")]
    Gemini3,
    #[serde(rename = "DeepSeek R1/V3")]
    DeepSeek,
    #[serde(rename = "Doubao (豆包)")]
    Doubao,
    #[serde(rename = "ChatGPT 5 (Preview)")]
    Gpt5,
    #[serde(rename = "Microsoft Copilot")]
    Copilot,
    #[serde(rename = "Claude 3.5 Sonnet/Opus")]
    Claude,
    #[serde(rename = "Midjourney (Image)")]
    Midjourney,
    #[serde(rename = "General / Agnostic")]
    General,
}

impl TargetModel {
    pub const ALL: [TargetModel; 8] = [
        TargetModel::Gemini3,
        TargetModel::DeepSeek,
        TargetModel::Doubao,
        TargetModel::Gpt5,
        TargetModel::Claude,
        TargetModel::Copilot,
        TargetModel::Midjourney,
        TargetModel::General,
    ];

    pub fn value(self) -> &'static str {
        match self {
            Self::Gemini3 => "Google Gemini 3",
            Self::DeepSeek => "DeepSeek R1/V3",
            Self::Doubao => "Doubao (豆包)",
            Self::Gpt5 => "ChatGPT 5 (Preview)",
            Self::Copilot => "Microsoft Copilot",
            Self::Claude => "Claude 3.5 Sonnet/Opus",
            Self::Midjourney => "Midjourney (Image)",
            Self::General => "General / Agnostic",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Gemini3 => "Google Gemini 3 / Pro",
            Self::DeepSeek => "DeepSeek (深度求索)",
            Self::Doubao => "豆包 (Doubao)",
            Self::Gpt5 => "ChatGPT 5 / 4o",
            Self::Copilot => "Microsoft Copilot",
            Self::Claude => "Claude 3.5",
            Self::Midjourney => "Midjourney (绘画)",
            Self::General => "通用大模型",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Gemini3 => "✨",
            Self::DeepSeek => "🐋",
            Self::Doubao => "🥟",
            Self::Gpt5 => "🧠",
            Self::Copilot => "✈",
            Self::Claude => "🎭",
            Self::Midjourney => "🎨",
            Self::General => "🤖",
        }
    }

    /// First word of the raw value, used as a compact tag in lists.
    pub fn short_tag(self) -> &'static str {
        self.value().split(' ').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptimizationGoal {
    #[serde(rename = "Clarity & Precision")]
    Clarity,
    #[serde(rename = "Creativity & Storytelling")]
    Creativity,
    #[serde(rename = "Coding & Technical")]
    Coding,
    #[serde(rename = "Structured Output (JSON/Markdown)")]
    Structure,
    #[serde(rename = "Persona & Roleplay")]
    Roleplay,
    #[serde(rename = "Chain of Thought (Reasoning)")]
    ChainOfThought,
}

impl OptimizationGoal {
    pub const ALL: [OptimizationGoal; 6] = [
        OptimizationGoal::Clarity,
        OptimizationGoal::Creativity,
        OptimizationGoal::Coding,
        OptimizationGoal::Structure,
        OptimizationGoal::Roleplay,
        OptimizationGoal::ChainOfThought,
    ];

    pub fn value(self) -> &'static str {
        match self {
            Self::Clarity => "Clarity & Precision",
            Self::Creativity => "Creativity & Storytelling",
            Self::Coding => "Coding & Technical",
            Self::Structure => "Structured Output (JSON/Markdown)",
            Self::Roleplay => "Persona & Roleplay",
            Self::ChainOfThought => "Chain of Thought (Reasoning)",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Clarity => "清晰精准",
            Self::Creativity => "创意写作",
            Self::Coding => "代码编程",
            Self::Structure => "结构化输出",
            Self::Roleplay => "角色扮演",
            Self::ChainOfThought => "链式思考 (CoT)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Clarity => "消除歧义，指令明确",
            Self::Creativity => "发散思维，文笔优美",
            Self::Coding => "生成高质量、无Bug的代码",
            Self::Structure => "严格的 JSON, Markdown 格式",
            Self::Roleplay => "设定特定专家人设",
            Self::ChainOfThought => "一步步推理，逻辑严密",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationConfig {
    pub target_model: TargetModel,
    pub goal: OptimizationGoal,
    pub language: String,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            target_model: TargetModel::Gemini3,
            goal: OptimizationGoal::Clarity,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OptimizationConfig, OptimizationGoal, TargetModel};

    #[test]
    fn config_serializes_enums_by_raw_value() {
        let config = OptimizationConfig {
            target_model: TargetModel::Midjourney,
            goal: OptimizationGoal::ChainOfThought,
            language: "English (英文)".to_string(),
        };

        let value = serde_json::to_value(&config).expect("config should serialize");
        assert_eq!(value["targetModel"], "Midjourney (Image)");
        assert_eq!(value["goal"], "Chain of Thought (Reasoning)");
        assert_eq!(value["language"], "English (英文)");
    }

    #[test]
    fn raw_values_match_serde_names() {
        for model in TargetModel::ALL {
            let encoded = serde_json::to_value(model).expect("model should serialize");
            assert_eq!(encoded, model.value());
        }
        for goal in OptimizationGoal::ALL {
            let encoded = serde_json::to_value(goal).expect("goal should serialize");
            assert_eq!(encoded, goal.value());
        }
    }

    #[test]
    fn short_tag_takes_first_word() {
        assert_eq!(TargetModel::DeepSeek.short_tag(), "DeepSeek");
        assert_eq!(TargetModel::General.short_tag(), "General");
    }
}
