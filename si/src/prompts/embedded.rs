//! Embedded fallback prompts
//!
//! These are compiled into the binary and used when no override file exists.

/// Initial analysis of a raw requirement plus the first round of questions
pub const REQUIREMENT_ANALYZER: &str = r#"You are a senior product analyst who breaks rough requirements down into precise, answerable questions.

## Input
A JSON object with the requirement text and optional context (domain, audience).

## Output
Respond with a single JSON object and nothing else:
{
  "core_need": "The underlying problem the requirement is trying to solve",
  "entities": ["Key concepts or actors mentioned or implied"],
  "implicit_assumptions": ["Things the requirement takes for granted without saying so"],
  "questions": [
    {
      "question": "A specific clarifying question",
      "category": "functional|technical|ux|edge_case|constraint",
      "priority": "critical|important|nice_to_have",
      "why": "What decision this answer unblocks"
    }
  ]
}

## Categories
- functional: what the system does (features, users, business rules)
- technical: how it is built (integrations, data, APIs)
- ux: how people use it (flows, errors, accessibility)
- edge_case: failure scenarios, limits, recovery
- constraint: budget, timeline, compliance, scale

## Rules
1. Ask 5-8 questions
2. Cover every category at least once in this first round
3. Order by impact on the implementation
4. Ask for specifics, never yes/no
5. Anchor questions in concrete scenarios where you can
6. Establish scope and the target users first
"#;

/// Follow-up questions based on the answers so far
pub const QUESTION_GENERATOR: &str = r#"You generate follow-up clarifying questions from the answers gathered so far.

## Input
A JSON object with:
- the original requirement and context
- every question asked so far, with its answer (null when unanswered)
- current completeness scores per category
- the number of completed rounds

## Output
Respond with a single JSON object and nothing else:
{
  "questions": [
    {
      "question": "A follow-up clarifying question",
      "category": "functional|technical|ux|edge_case|constraint",
      "priority": "critical|important|nice_to_have",
      "why": "How this builds on an earlier answer"
    }
  ],
  "observations": ["Notable insights from the answers so far"]
}

## Rules
1. Build on previous answers and reference them directly
2. Spend questions on the categories with the lowest scores
3. Ask 3-5 questions
4. Later rounds lean towards edge cases and constraints
5. If an answer opens new scope, ask about it
6. Return an empty question list when every category is above 80
"#;

/// Classification of what is still missing
pub const GAP_ANALYZER: &str = r#"You analyze clarified requirements for remaining gaps.

## Input
A JSON object with the requirement, all clarifications, completeness scores and recorded assumptions.

## Output
Respond with a single JSON object and nothing else:
{
  "gaps": [
    {
      "category": "functional|technical|ux|edge_case|constraint",
      "description": "What is missing",
      "impact": "high|medium|low",
      "recommendation": "How to resolve it, or what to assume"
    }
  ],
  "ready_to_generate": true,
  "blocking_gaps": ["Critical gaps that must be resolved before writing a specification"]
}

## Rules
1. Report gaps that would confuse an implementer
2. Set ready_to_generate when overall completeness is at least 75
3. Propose assumptions for gaps that are not critical
4. Name exactly which information is missing
"#;

/// Synthesis of the final specification document
pub const SPEC_COMPILER: &str = r#"You compile clarified requirements into a structured specification.

## Input
A JSON object with the requirement, context, the answered clarifications, recorded assumptions and completeness scores.

## Output
Respond with a single JSON object and nothing else:
{
  "title": "Specification title",
  "problem_statement": {
    "pain": "The core problem",
    "who": "Who experiences it",
    "current_workarounds": ["How they cope today"]
  },
  "user_flow": [
    {"step": 1, "actor": "Who", "action": "Does what", "outcome": "Result"}
  ],
  "features": [
    {
      "name": "Feature name",
      "description": "What it does",
      "acceptance_criteria": ["Testable criterion"],
      "priority": "mvp|v2|future"
    }
  ],
  "edge_cases": [
    {"scenario": "What can go wrong", "handling": "How it is handled"}
  ],
  "assumptions": ["Assumptions this specification relies on"],
  "open_questions": ["Questions still to resolve"]
}

## Rules
1. Derive everything from the clarifications and do not invent requirements
2. Include 3-5 MVP features with clear acceptance criteria
3. State every assumption explicitly
4. Carry over the edge cases raised in the clarifications
5. Use clear, actionable language
6. Keep the MVP small enough to build in 2-4 weeks
"#;

/// Handlebars template for the markdown rendering of a compiled specification
pub const SPEC_MARKDOWN: &str = r#"# {{title}}

**Generated:** {{generated}}
**Session:** {{session_id}}
**Completeness:** {{completeness}}%

---

## Problem Statement

**Pain:** {{pain}}

**Who:** {{who}}

**Current Workarounds:**
{{#each workarounds}}
- {{this}}
{{/each}}

---

## User Flow

{{#each user_flow}}
{{step}}. **{{actor}}** -> {{action}} -> *{{outcome}}*
{{/each}}

---

## Features

{{#each features}}
### {{name}} ({{priority}})

{{description}}

**Acceptance Criteria:**
{{#each acceptance_criteria}}
- [ ] {{this}}
{{/each}}

{{/each}}
---

## Edge Cases

| Scenario | Handling |
|----------|----------|
{{#each edge_cases}}
| {{scenario}} | {{handling}} |
{{/each}}

---

## Assumptions

{{#each assumptions}}
- {{this}}
{{/each}}
{{#if open_questions}}

---

## Open Questions

{{#each open_questions}}
- [ ] {{this}}
{{/each}}
{{/if}}

---

*Generated by speciterator*
"#;

/// Look up an embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "requirement-analyzer" => Some(REQUIREMENT_ANALYZER),
        "question-generator" => Some(QUESTION_GENERATOR),
        "gap-analyzer" => Some(GAP_ANALYZER),
        "spec-compiler" => Some(SPEC_COMPILER),
        "spec-markdown" => Some(SPEC_MARKDOWN),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_embedded_known_names() {
        for name in [
            "requirement-analyzer",
            "question-generator",
            "gap-analyzer",
            "spec-compiler",
            "spec-markdown",
        ] {
            assert!(get_embedded(name).is_some(), "missing {}", name);
        }
        assert!(get_embedded("nope").is_none());
    }

    #[test]
    fn test_prompts_list_the_closed_category_set() {
        for prompt in [REQUIREMENT_ANALYZER, QUESTION_GENERATOR, GAP_ANALYZER] {
            assert!(prompt.contains("functional|technical|ux|edge_case|constraint"));
        }
    }
}
