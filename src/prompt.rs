//! Instruction prompts sent to the generation service.
//!
//! Every prompt pairs a fixed system persona with an instruction body. The
//! body asks for a fixed list of sections, each starting with [`MARKER`] and
//! separated by a blank line, with no headings or bold markup, and closes
//! with a disclaimer naming the query.
//!
//! The formatting rules are instructions only. Nothing here can verify that
//! the model followed them; replies are passed through as opaque text.

use crate::classify::QueryClass;

/// Glyph that prefixes every section.
pub const MARKER: &str = "•";

/// System persona for every call.
pub const SYSTEM_PROMPT: &str = "당신은 건강 영양 전문가입니다.";

/// A complete request to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub instructions: String,
}

/// Builds deterministic prompts from a query and its class.
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Prompt using the template for `class`.
    pub fn build(&self, query: &str, class: QueryClass) -> Prompt {
        let query = query.trim();
        let mut body = format!("'{query}'에 대해 아래 항목을 순서대로 답변해줘.\n\n");
        body.push_str(&format_rules());
        body.push('\n');
        for section in sections(query, class) {
            body.push_str(&format!("{MARKER} {section}\n"));
        }
        body.push_str(&format!(
            "{MARKER} 마지막 항목은 정확히 다음 문장으로 써: \"{}\"\n",
            disclaimer(query, class)
        ));
        prompt(body)
    }

    /// Prompt that lets the model choose the template itself.
    ///
    /// Used for single-call classification. The chosen class must not appear
    /// in the reply.
    pub fn build_self_selecting(&self, query: &str) -> Prompt {
        let query = query.trim();
        let mut body = format!(
            "'{query}'이(가) 증상인지 영양소인지 스스로 판단한 뒤, 해당하는 형식 하나만 골라 답변해줘. \
             판단 결과나 형식 이름은 출력하지 마.\n\n"
        );
        body.push_str(&format_rules());
        for (heading, class) in [
            ("증상인 경우", QueryClass::Symptom),
            ("영양소인 경우", QueryClass::Nutrient),
        ] {
            body.push_str(&format!("\n[{heading}]\n"));
            for section in sections(query, class) {
                body.push_str(&format!("{MARKER} {section}\n"));
            }
            body.push_str(&format!(
                "{MARKER} 마지막 항목은 정확히 다음 문장으로 써: \"{}\"\n",
                disclaimer(query, class)
            ));
        }
        prompt(body)
    }

    /// Prompt asking for a single class label.
    ///
    /// The reply is parsed with [`parse_label`](crate::classify::parse_label).
    pub fn build_label(&self, query: &str) -> Prompt {
        let query = query.trim();
        prompt(format!(
            "'{query}'이(가) 신체 증상이면 SYMPTOM, 영양소나 영양 성분이면 NUTRIENT 라고만 답해줘. \
             둘 다 해당하면 SYMPTOM 으로 답해. 다른 말은 절대 덧붙이지 마."
        ))
    }
}

fn prompt(instructions: String) -> Prompt {
    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        instructions,
    }
}

fn format_rules() -> String {
    format!(
        "형식 규칙:\n\
         - 각 항목은 '{MARKER}' 기호로 시작해.\n\
         - 항목과 항목 사이에는 빈 줄을 하나 넣어.\n\
         - 제목, 소제목, 굵은 글씨(**) 같은 강조 표시는 쓰지 마.\n\
         - 항목 순서를 바꾸지 마.\n"
    )
}

fn sections(query: &str, class: QueryClass) -> [String; 4] {
    match class {
        QueryClass::Symptom => [
            format!("{query}의 주요 원인 요약"),
            format!("{query}에 도움이 되는 영양소"),
            format!("{query}에 도움이 되는 음식"),
            format!("{query} 개선에 도움이 되는 생활 습관"),
        ],
        QueryClass::Nutrient => [
            format!("{query}의 체내 역할과 효능"),
            format!("{query} 결핍 시 나타나는 증상"),
            format!("{query} 함량이 높은 음식"),
            format!("{query}의 효과적인 섭취 방법"),
        ],
    }
}

/// Fixed closing sentence for `class`.
pub fn disclaimer(query: &str, class: QueryClass) -> String {
    match class {
        QueryClass::Symptom => format!(
            "이 정보는 '{query}'에 대한 일반적인 안내이며, 증상이 계속되면 전문가와 상담하세요."
        ),
        QueryClass::Nutrient => format!(
            "이 정보는 '{query}'에 대한 일반적인 안내이며, 결핍이 의심되면 전문가와 상담하세요."
        ),
    }
}
