//! LLM prompt engineering for functionality extraction

/// System message sent with every extraction call
pub const SYSTEM_PROMPT: &str =
    "You are an expert software analyst. Extract functionalities from requirements documents and return structured JSON.";

const EXTRACTION_INSTRUCTIONS: &str = r#"Extract functionality packets from the requirements text below.

CRITICAL INSTRUCTIONS:
- Return ONLY a valid JSON array
- No explanations, no markdown, no additional text
- If no functionalities are present, return: []
- Each functionality must be a complete, independently implementable feature
- Look for functional requirements, use cases and system features"#;

const RECORD_FORMAT: &str = r#"REQUIRED JSON FORMAT:
[
  {
    "name": "Feature Name (e.g., Student Registration)",
    "description": "What this feature does",
    "useCases": ["Specific use case 1", "Specific use case 2"],
    "activityDiagrams": ["Workflow description 1"],
    "context": "Additional context or related information",
    "requirements": ["Requirement 1", "Requirement 2"],
    "dependencies": ["Other feature name"]
  }
]"#;

enum PromptSource<'a> {
    Chunk {
        text: &'a str,
        index: usize,
        total: usize,
    },
    RawPayload {
        payload: &'a str,
        truncated: bool,
    },
}

/// Builds prompts for the LLM to extract functionality records
pub struct PromptBuilder<'a> {
    source: PromptSource<'a>,
}

impl<'a> PromptBuilder<'a> {
    /// Prompt for one text chunk; `index` is zero-based
    pub fn for_chunk(text: &'a str, index: usize, total: usize) -> Self {
        Self {
            source: PromptSource::Chunk { text, index, total },
        }
    }

    /// Prompt for an encoded raw document payload
    pub fn for_raw_payload(payload: &'a str, truncated: bool) -> Self {
        Self {
            source: PromptSource::RawPayload { payload, truncated },
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(EXTRACTION_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(RECORD_FORMAT);
        prompt.push_str("\n\n");

        match &self.source {
            PromptSource::Chunk { text, index, total } => {
                prompt.push_str(&format!("REQUIREMENTS TEXT CHUNK {}/{}:\n", index + 1, total));
                prompt.push_str(text);
                prompt.push_str("\n\nEXTRACT FUNCTIONALITIES FROM THIS TEXT:");
            }
            PromptSource::RawPayload { payload, truncated } => {
                prompt.push_str(
                    "The document text could not be extracted. Below is the raw document, base64 encoded.\n",
                );
                prompt.push_str("BASE64 DOCUMENT CONTENT:\n");
                prompt.push_str(payload);
                if *truncated {
                    prompt.push_str("...");
                }
                prompt.push_str("\n\nEXTRACT FUNCTIONALITIES FROM THIS DOCUMENT:");
            }
        }

        prompt
    }
}
