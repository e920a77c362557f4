use crate::models::{Instruction, PromptBrief};

pub const SYSTEM: &str = include_str!("../data/prompts/system.txt");
pub const USER: &str = include_str!("../data/prompts/user.txt");

/// Returned to callers when the provider produced no text.
pub const FALLBACK_PROMPT: &str = "Sorry, the AI could not generate a prompt.";

/// Stands in for optional brief fields the caller left out.
pub const UNSPECIFIED: &str = "unspecified";

/// Replace `{{key}}` placeholders in a template string.
///
/// Single left-to-right pass: substituted values are copied verbatim and never
/// scanned for placeholders. Unknown keys are left as written.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}

/// Build the upstream instruction for a brief.
pub fn instruction_for(brief: &PromptBrief) -> Instruction {
    let style = brief.style.as_deref().unwrap_or(UNSPECIFIED);
    let lighting = brief.lighting.as_deref().unwrap_or(UNSPECIFIED);

    Instruction {
        system: SYSTEM.trim().to_string(),
        user: render(
            USER.trim(),
            &[("idea", brief.idea.as_str()), ("style", style), ("lighting", lighting)],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_placeholders() {
        assert_eq!(
            render("{{a}} {{missing}} {{a", &[("a", "x")]),
            "x {{missing}} {{a"
        );
    }

    #[test]
    fn test_render_does_not_expand_substituted_values() {
        assert_eq!(
            render("{{a}}|{{b}}", &[("a", "{{b}}"), ("b", "two")]),
            "{{b}}|two"
        );
    }

    #[test]
    fn test_instruction_keeps_placeholders_in_idea_verbatim() {
        let brief = PromptBrief {
            idea: "a sign reading {{lighting}}".to_string(),
            style: Some("noir".to_string()),
            lighting: Some("neon".to_string()),
        };

        assert_eq!(
            instruction_for(&brief).user,
            "Idea: a sign reading {{lighting}}, Style: noir, Lighting: neon"
        );
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!SYSTEM.trim().is_empty());
        assert!(!USER.trim().is_empty());
    }

    #[test]
    fn test_user_template_has_placeholders() {
        assert!(USER.contains("{{idea}}"));
        assert!(USER.contains("{{style}}"));
        assert!(USER.contains("{{lighting}}"));
    }

    #[test]
    fn test_instruction_labels_every_field() {
        let brief = PromptBrief {
            idea: "a lighthouse".to_string(),
            style: Some("watercolor".to_string()),
            lighting: Some("golden hour".to_string()),
        };

        let instruction = instruction_for(&brief);
        assert_eq!(
            instruction.user,
            "Idea: a lighthouse, Style: watercolor, Lighting: golden hour"
        );
        assert!(instruction.system.contains("prompt engineer"));
    }

    #[test]
    fn test_instruction_fills_missing_fields() {
        let brief = PromptBrief {
            idea: "a lighthouse".to_string(),
            style: None,
            lighting: None,
        };

        assert_eq!(
            instruction_for(&brief).user,
            "Idea: a lighthouse, Style: unspecified, Lighting: unspecified"
        );
    }
}
