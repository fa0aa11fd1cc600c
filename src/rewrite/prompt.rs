use crate::catalog::OptimizationConfig;

pub const REWRITE_MODEL: &str = "gemini-2.5-flash";
pub const REWRITE_TEMPERATURE: f32 = 0.7;

pub const SYSTEM_INSTRUCTION: &str = "你是一位世界级的提示词工程师（Prompt Engineer）和 AI 逻辑专家。
你的目标是将用户输入的原始、模糊的需求，转化为针对特定大语言模型（LLM）优化的高质量、结构化提示词。

请遵循以下规则：
1. **深度分析**: 理解用户原始草稿的核心意图和潜在需求。
2. **应用最佳实践**: 适当使用思维链（Chain-of-Thought）、分隔符、角色设定（Persona）和少样本（Few-Shot）示例。
3. **模型适配性**: 根据目标模型调整语法和语气：
   - **DeepSeek/Gemini 3**: 强调逻辑推理步骤和深度思考。
   - **Claude**: 偏好 XML 标签结构（如 <task>, <context>）。
   - **Midjourney**: 使用特定参数（--ar, --v 等）和视觉描述词。
   - **ChatGPT/豆包/Copilot**: 清晰、直接、分步骤的指令。
4. **纯净输出**: 除非用户特别询问，否则只输出优化后的提示词内容，不要包含“这是您的提示词”等闲聊废话。
5. **结构化格式**: 使用 Markdown 标题、项目符号和清晰的板块（背景、任务、约束、输出格式）使提示词易读且鲁棒。";

/// Builds the user turn: the three selections, then the draft verbatim
/// inside a `"""` block, then the rewrite instruction.
pub fn rewrite_message(raw_input: &str, config: &OptimizationConfig) -> String {
    format!(
        "目标模型: {model}\n\
         优化目标: {goal}\n\
         输出语言: {language}\n\
         \n\
         用户的原始草稿:\n\
         \"\"\"\n\
         {raw_input}\n\
         \"\"\"\n\
         \n\
         请将用户的原始草稿重写为一个完美、生产就绪的提示词（Prompt）。\n\
         如果用户输入的是中文，请默认保持中文输出，除非\"输出语言\"另有指定。",
        model = config.target_model.value(),
        goal = config.goal.value(),
        language = config.language,
    )
}

#[cfg(test)]
mod tests {
    use super::rewrite_message;
    use crate::catalog::{OptimizationConfig, OptimizationGoal, TargetModel};

    #[test]
    fn message_embeds_selections_in_order_and_draft_verbatim() {
        let config = OptimizationConfig {
            target_model: TargetModel::DeepSeek,
            goal: OptimizationGoal::Structure,
            language: "Klingon".to_string(),
        };
        let draft = "  write a poem\nabout \"rust\"  ";
        let message = rewrite_message(draft, &config);

        let model_at = message.find("DeepSeek R1/V3").expect("model value present");
        let goal_at = message
            .find("Structured Output (JSON/Markdown)")
            .expect("goal value present");
        let language_at = message.find("Klingon").expect("language present");
        let draft_at = message
            .find(&format!("\"\"\"\n{draft}\n\"\"\""))
            .expect("draft inside delimiter block");

        assert!(model_at < goal_at && goal_at < language_at && language_at < draft_at);
        assert!(message.ends_with("除非\"输出语言\"另有指定。"));
    }
}
