//! Prompt Builder System
//!
//! System prompts for the three generation modes plus the user message that
//! carries the file payload.

use crate::ai::provider::{GenerationMode, GenerationRequest};
use crate::documentation::bundle::file_paths;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Opening instruction paragraph
    Instruction(String),
    /// Numbered outline entry with bullet points
    Outline { title: String, points: Vec<String> },
    /// Focus enforcement with restrictions
    Focus {
        target: String,
        restrictions: Vec<String>,
    },
    /// Labelled value (`Label: value`)
    Field { label: String, value: String },
    Custom(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instruction(mut self, text: &str) -> Self {
        self.sections
            .push(PromptSection::Instruction(text.to_string()));
        self
    }

    /// Add a numbered outline entry; numbering follows insertion order
    pub fn outline(mut self, title: &str, points: &[&str]) -> Self {
        self.sections.push(PromptSection::Outline {
            title: title.to_string(),
            points: points.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn focus(mut self, target: &str, restrictions: &[&str]) -> Self {
        self.sections.push(PromptSection::Focus {
            target: target.to_string(),
            restrictions: restrictions.iter().map(|r| r.to_string()).collect(),
        });
        self
    }

    pub fn field(mut self, label: &str, value: &str) -> Self {
        self.sections.push(PromptSection::Field {
            label: label.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn custom(mut self, content: &str) -> Self {
        self.sections
            .push(PromptSection::Custom(content.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();
        let mut number = 0;

        for section in self.sections {
            match section {
                PromptSection::Instruction(text) => {
                    prompt.push_str(&text);
                    prompt.push_str("\n\n");
                }
                PromptSection::Outline { title, points } => {
                    number += 1;
                    prompt.push_str(&format!("{}. {}\n", number, title));
                    for point in points {
                        prompt.push_str(&format!("   - {}\n", point));
                    }
                    prompt.push('\n');
                }
                PromptSection::Focus {
                    target,
                    restrictions,
                } => {
                    prompt.push_str(&format!("Focus ONLY on: {}\n", target));
                    for restriction in restrictions {
                        prompt.push_str(&format!("- {}\n", restriction));
                    }
                    prompt.push('\n');
                }
                PromptSection::Field { label, value } => {
                    prompt.push_str(&format!("{}: {}\n", label, value));
                }
                PromptSection::Custom(content) => {
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

/// Preset prompts per generation mode
pub struct PromptTemplates;

impl PromptTemplates {
    /// System prompt for a request
    pub fn system(request: &GenerationRequest) -> String {
        match request.mode {
            GenerationMode::Single => Self::single().build(),
            GenerationMode::SingleWithContext => {
                let target = request.target_file.as_deref().unwrap_or_default();
                let context = file_paths(&request.files)
                    .into_iter()
                    .filter(|p| p != target)
                    .collect::<Vec<_>>()
                    .join("\n");
                Self::single_with_context(target, &context).build()
            }
            GenerationMode::CombinedReadme => Self::combined_readme().build(),
        }
    }

    /// User message carrying the file payload
    pub fn user_message(request: &GenerationRequest) -> String {
        match (request.mode, request.target_file.as_deref()) {
            (GenerationMode::SingleWithContext, Some(target)) => format!(
                "Please generate documentation for this target file:\n\n\
                 === TARGET FILE ===\n{}\n\n=== CONTEXT FILES ===\n{}",
                target, request.files
            ),
            _ => format!(
                "Please generate documentation for the following files:\n\n{}",
                request.files
            ),
        }
    }

    pub fn single() -> PromptBuilder {
        PromptBuilder::new()
            .instruction(
                "Analyze the following code file and create comprehensive documentation that includes:",
            )
            .outline("File overview and purpose", &[])
            .outline("Key components/functions/classes", &[])
            .outline("Important dependencies and imports", &[])
            .outline("Usage examples where applicable", &[])
            .outline("Notable implementation details", &[])
            .custom("Format the documentation using markdown with clear sections.")
    }

    pub fn single_with_context(target: &str, context_files: &str) -> PromptBuilder {
        PromptBuilder::new()
            .instruction(
                "Create comprehensive documentation for ONLY the target file, while using the \
                 other files as context to better understand its role and relationships.",
            )
            .focus(
                target,
                &[
                    "DO NOT document the context files",
                    "Context files are provided only to show how the target fits into the larger system",
                ],
            )
            .outline(
                "File Overview",
                &[
                    "Purpose and main responsibilities of THIS file",
                    "Key components/functions/classes defined in THIS file",
                ],
            )
            .outline(
                "Context & Dependencies",
                &[
                    "How THIS file integrates with other files",
                    "Required dependencies and imports",
                    "What THIS file provides to other files",
                    "What THIS file uses from other files",
                ],
            )
            .outline(
                "Implementation Details",
                &[
                    "Key algorithms and patterns in THIS file",
                    "Important state management",
                    "Notable technical decisions",
                ],
            )
            .outline(
                "Usage Examples",
                &[
                    "How to use the components/functions from THIS file",
                    "Integration examples showing how THIS file works with others",
                ],
            )
            .outline(
                "Related Files",
                &[
                    "Brief overview of how THIS file relates to others",
                    "Key dependencies and relationships",
                ],
            )
            .custom(
                "Format using markdown with clear sections. Remember to focus ONLY on documenting the target file.",
            )
            .field("Target File to Document", target)
            .field("Context Files (for reference only)", context_files)
    }

    pub fn combined_readme() -> PromptBuilder {
        PromptBuilder::new()
            .instruction(
                "Create a comprehensive README.md for this collection of files that explains \
                 how they work together as a system. Use `# Project Component Documentation` \
                 as the title.",
            )
            .outline(
                "Overview",
                &[
                    "High-level explanation of this component/module",
                    "Purpose and main functionality",
                    "Key features",
                ],
            )
            .outline(
                "Architecture",
                &[
                    "How the files work together",
                    "Key relationships and dependencies",
                    "Data flow between components",
                ],
            )
            .outline(
                "Core Components",
                &[
                    "Purpose and responsibilities of each major component",
                    "Key features",
                    "Dependencies and relationships",
                    "Usage examples",
                ],
            )
            .outline(
                "Technical Details",
                &[
                    "Important implementation details",
                    "State management",
                    "Key patterns used",
                ],
            )
            .outline(
                "File Structure",
                &[
                    "Explanation of each file's role",
                    "How files are organized",
                    "Key relationships between files",
                ],
            )
            .outline(
                "Integration Guide",
                &[
                    "How to use these components",
                    "Common integration patterns",
                    "Important considerations",
                ],
            )
            .custom("Format using markdown with clear sections and subsections.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documentation::bundle::{BundleEntry, concatenate};

    fn request(mode: GenerationMode, files: String, target: Option<&str>) -> GenerationRequest {
        GenerationRequest {
            files,
            target_file: target.map(str::to_string),
            mode,
            model: "gpt-4o-mini".into(),
            file_structure: None,
        }
    }

    #[test]
    fn test_outline_numbering() {
        let prompt = PromptBuilder::new()
            .instruction("Intro")
            .outline("First", &["a"])
            .outline("Second", &[])
            .build();

        assert!(prompt.starts_with("Intro"));
        assert!(prompt.contains("1. First\n   - a"));
        assert!(prompt.contains("2. Second"));
    }

    #[test]
    fn test_single_with_context_names_target_and_context() {
        let files = concatenate(&[
            BundleEntry::new("src/a.ts", "export const a = 1;"),
            BundleEntry::new("src/b.ts", "import { a } from './a';"),
        ]);
        let req = request(GenerationMode::SingleWithContext, files, Some("src/b.ts"));
        let system = PromptTemplates::system(&req);

        assert!(system.contains("Target File to Document: src/b.ts"));
        assert!(system.contains("Context Files (for reference only): src/a.ts"));
        assert!(!system.contains("export const"));

        let user = PromptTemplates::user_message(&req);
        assert!(user.starts_with("Please generate documentation for this target file:"));
        assert!(user.contains("=== TARGET FILE ===\nsrc/b.ts"));
        assert!(user.contains("=== CONTEXT FILES ===\n"));
    }

    #[test]
    fn test_combined_readme_prompt() {
        let req = request(GenerationMode::CombinedReadme, "x".into(), None);
        let system = PromptTemplates::system(&req);
        assert!(system.contains("README.md"));
        assert!(system.contains("6. Integration Guide"));
        assert_eq!(
            PromptTemplates::user_message(&req),
            "Please generate documentation for the following files:\n\nx"
        );
    }
}
