pub const RESEARCH_SYSTEM_PROMPT: &str = "You are an expert research analyst.";

pub const ANALYST_SYSTEM_PROMPT: &str = "You are a senior research analyst.";

const QUERY_SUFFIXES: [&str; 3] = [
    "recent developments",
    "key players and companies",
    "major challenges and opportunities",
];

const SYNTHESIS_INSTRUCTIONS: &str = r#"You are an expert researcher. Synthesize this data on '{research_topic}'.
The data below comes from several web searches, each introduced by its query.
Provide a concise, factual summary based *only* on the provided data (max 600 words).
Cover recent developments, key players and companies, and major challenges and opportunities."#;

const REPORT_SECTIONS: &str = "- **Executive Summary**\n\
- **Key Findings**\n\
- **Detailed Analysis**\n\
- **Conclusions & Recommendations**";

/// The fixed set of web searches issued for one topic.
pub fn search_queries(research_topic: &str) -> Vec<String> {
    QUERY_SUFFIXES
        .iter()
        .map(|suffix| format!("{research_topic} {suffix}"))
        .collect()
}

pub fn format_synthesis_prompt(research_topic: &str, search_data: &str) -> String {
    format!(
        "{}\n\n{}",
        SYNTHESIS_INSTRUCTIONS.replace("{research_topic}", research_topic),
        search_data
    )
}

pub fn format_report_prompt(research_topic: &str, research_data: &str, current_date: &str) -> String {
    format!(
        "You are a senior research analyst. Create a detailed, well-structured markdown report on '{research_topic}'.\n\n\
         Use the following research summaries to construct your report. Adhere strictly to the provided information.\n\n\
         Include the following sections:\n{REPORT_SECTIONS}\n\n\
         --- RESEARCH DATA START ---\n{research_data}\n--- RESEARCH DATA END ---\n\n\
         Current date: {current_date}"
    )
}
