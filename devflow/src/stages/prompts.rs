//! Prompt templates sent to the language model.

use crate::context::{ComponentRecord, ProblemData};

/// Asks for clarification questions about the problem.
#[must_use]
pub fn clarification_questions(problem: &ProblemData) -> String {
    format!(
        "Analyze this problem description and identify areas that need clarification:

Problem: {}
Context: {}
Tech Stack: {}

Generate specific questions to clarify:
1. Functional requirements
2. Non-functional requirements
3. User interface needs
4. Integration requirements
5. Constraints and limitations

Format as a numbered list of clear, specific questions.",
        problem.initial_problem, problem.context, problem.preferred_tech
    )
}

/// Asks for the requirements document.
#[must_use]
pub fn requirements_document(initial_problem: &str, clarifications: &str) -> String {
    format!(
        "Based on the initial problem and user clarifications, create a comprehensive requirements document:

Initial Problem: {initial_problem}
User Clarifications: {clarifications}

Create a structured requirements document with:
1. Project Overview
2. Functional Requirements
3. Non-Functional Requirements
4. Technical Requirements
5. User Interface Requirements
6. Success Criteria
7. Constraints and Assumptions"
    )
}

/// Asks for a solution architecture.
#[must_use]
pub fn architecture(requirements: &str) -> String {
    format!(
        "Based on these requirements, design a software solution:

Requirements: {requirements}

Provide:
1. Solution Architecture Overview
2. Technology Stack Recommendation
3. System Components and Their Interactions
4. Data Flow and Storage Strategy
5. Key Design Decisions and Rationale"
    )
}

/// Asks for an implementation plan for the architecture.
#[must_use]
pub fn implementation_plan(architecture: &str) -> String {
    format!(
        "Create a detailed implementation plan for this solution:

Architecture: {architecture}

Break down into:
1. Development Phases (with priorities)
2. Specific Tasks for Each Phase
3. Dependencies Between Tasks
4. Estimated Effort and Timeline
5. Risk Assessment and Mitigation
6. Testing Strategy"
    )
}

/// Asks for an actionable task list.
#[must_use]
pub fn task_breakdown(plan: &str) -> String {
    format!(
        "Convert the implementation plan into specific, actionable tasks:

Plan: {plan}

Create a task list with:
- Task ID
- Task Description
- Prerequisites
- Deliverables
- Priority Level"
    )
}

/// Asks for the code of one implementation phase.
#[must_use]
pub fn phase_code(phase: &str, architecture: &str, plan: &str) -> String {
    format!(
        "Implement {phase} based on:

Architecture: {architecture}
Plan: {plan}

Generate actual, working code with:
1. Proper file structure
2. Clean, documented code
3. Error handling
4. Best practices"
    )
}

/// Asks for tests covering one component.
#[must_use]
pub fn component_tests(component: &ComponentRecord) -> String {
    format!(
        "Create comprehensive tests for this component:

Component: {}
Code: {}

Generate:
1. Unit tests
2. Integration tests
3. Edge cases
4. Error handling tests
5. Performance tests (if applicable)

Use appropriate testing framework and include assertions.",
        component.phase, component.code
    )
}

/// Asks for the project README.
#[must_use]
pub fn readme(requirements: &str, architecture: &str, components: &[String]) -> String {
    format!(
        "Create a comprehensive README.md file for this project:

Requirements: {requirements}
Architecture: {architecture}
Components: {components:?}

Include:
1. Project Title and Description
2. Features and Functionality
3. Architecture Overview
4. Installation Instructions
5. Usage Guide with Examples
6. API Documentation (if applicable)
7. Contributing Guidelines
8. License Information
9. Roadmap and Future Plans
10. Support and Contact Information"
    )
}

/// Asks for a changelog dated `date`.
#[must_use]
pub fn changelog(components: &[String], test_count: usize, date: &str) -> String {
    format!(
        "Create a CHANGELOG.md file documenting the development process:

Implementation phases: {components:?}
Test results: {test_count} tests

Format as:
# Changelog

## [1.0.0] - {date}

### Added
- List of implemented features

### Changed
- Any modifications made

### Fixed
- Issues resolved

### Technical
- Implementation details"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clarification_prompt_embeds_problem() {
        let problem = ProblemData::new("build a to-do app", "", "rust");
        let prompt = clarification_questions(&problem);
        assert!(prompt.contains("Problem: build a to-do app"));
        assert!(prompt.contains("Tech Stack: rust"));
    }

    #[test]
    fn test_changelog_prompt_is_dated() {
        let prompt = changelog(&["Setup".to_string()], 4, "2024-05-01");
        assert!(prompt.contains("## [1.0.0] - 2024-05-01"));
        assert!(prompt.contains("Test results: 4 tests"));
        assert!(prompt.contains(r#"["Setup"]"#));
    }
}
