//! Tutor settings catalog
//!
//! Immutable lookup tables resolved once at process start: tutor personas,
//! few-shot example statements, and the knowledge-component definitions.
//! Injected into the router rather than read as globals so tests can
//! substitute their own tables.

use std::collections::HashMap;

/// Supported tutor identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TutorId {
    MathParentTool,
}

impl TutorId {
    /// Wire value for this tutor
    pub fn as_str(&self) -> &'static str {
        match self {
            TutorId::MathParentTool => "math-parent-tool",
        }
    }

    /// Parse a wire value into a tutor identifier
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "math-parent-tool" => Some(TutorId::MathParentTool),
            _ => None,
        }
    }

    /// All supported wire values, for error messages
    pub fn members() -> Vec<&'static str> {
        vec![TutorId::MathParentTool.as_str()]
    }
}

/// One knowledge component: a named math skill with a worked example
#[derive(Debug, Clone)]
struct MathOperation {
    equation: &'static str,
    operation: &'static str,
    result: &'static str,
}

impl MathOperation {
    fn definition(&self) -> String {
        format!(
            "For example, we have the following equation: {}. And we conduct the following operation: {} And get the result {}.",
            self.equation, self.operation, self.result
        )
    }
}

/// Persona and few-shot text for one tutor
#[derive(Debug, Clone)]
pub struct TutorPersona {
    pub persona_statement: String,
    pub few_shot_examples: String,
}

/// Immutable tutor-settings catalog
///
/// Holds the persona statements and knowledge-component definitions for
/// every supported tutor. Built once at startup via [`Catalog::builtin`].
#[derive(Debug, Clone)]
pub struct Catalog {
    personas: HashMap<TutorId, TutorPersona>,
    knowledge_components: HashMap<String, String>,
}

const MATH_PARENT_PERSONA: &str = "You are a parent providing assistance to your middle-school child for their math homework.\nEach response should have a short justification delimited with square brackets before the message. Please do not include a introductory sentence before the response recommendations, just begin with the recommendations. You should delimit each recommended response with #.";

const MATH_PARENT_FEW_SHOT: &str = "[Praise your child for a correct attempt] Great job on solving that step. # [Ask to self explain] Tell me what you mean by that. # [Guide your child through the problem] What do you think we should do with both sides of the equation?";

const MATH_OPERATIONS: &[(&str, MathOperation)] = &[
    (
        "subtraction-var",
        MathOperation {
            equation: "3x + 13 = 2x + 6",
            operation: "Subtract 2x from both sides.",
            result: "3x - 2x + 13 = 2x - 2x + 6",
        },
    ),
    (
        "subtraction-const",
        MathOperation {
            equation: "3x + 13 = 2x + 6",
            operation: "Subtract 6 from both sides.",
            result: "3x + 13 - 6 = 2x + 6 - 6",
        },
    ),
    (
        "division-simple",
        MathOperation {
            equation: "4x = 20",
            operation: "Divide both sides by 4.",
            result: "4x/4 = 20/4",
        },
    ),
    (
        "division-complex",
        MathOperation {
            equation: "2(x + 3) = 16",
            operation: "Divide both sides by 2.",
            result: "(2(x + 3))/2 = 16/2; x + 3 = 8",
        },
    ),
    (
        "distribute-multiplication",
        MathOperation {
            equation: "2(x + 4) = 10",
            operation: "Distribute the multiplication, multiply both sides by 2.",
            result: "2*x + 2*4 = 10",
        },
    ),
    (
        "divide",
        MathOperation {
            equation: "4x/4 = 20/4",
            operation: "Simplify the division, divide both sides by 4.",
            result: "x = 5",
        },
    ),
    (
        "combine-like-var",
        MathOperation {
            equation: "4x - 2x + 1 = 15",
            operation: "Combine like variable terms, simplify 4x - 2x.",
            result: "2x + 1 = 15",
        },
    ),
    (
        "combine-like-const",
        MathOperation {
            equation: "3x - 1 + 1 = -10 + 1",
            operation: "Combine like constant terms, add 1 to both sides to simplify.",
            result: "3x = -9",
        },
    ),
    (
        "cancel-var",
        MathOperation {
            equation: "10x + 8 = 14x + 4",
            operation: "Cancel the variable term (10x) from both sides.",
            result: "8 = 4x + 4",
        },
    ),
    (
        "cancel-const",
        MathOperation {
            equation: "2x + 5 = 15",
            operation: "Cancel the constant term (5) from both sides.",
            result: "2x = 10",
        },
    ),
];

impl Catalog {
    /// Build the catalog from the built-in tutor settings tables
    pub fn builtin() -> Self {
        let mut personas = HashMap::new();
        personas.insert(
            TutorId::MathParentTool,
            TutorPersona {
                persona_statement: MATH_PARENT_PERSONA.to_string(),
                few_shot_examples: MATH_PARENT_FEW_SHOT.to_string(),
            },
        );

        let knowledge_components = MATH_OPERATIONS
            .iter()
            .map(|(name, op)| (name.to_string(), op.definition()))
            .collect();

        Self {
            personas,
            knowledge_components,
        }
    }

    /// Look up the persona for a tutor
    pub fn persona(&self, tutor: TutorId) -> Option<&TutorPersona> {
        self.personas.get(&tutor)
    }

    /// Look up a knowledge-component definition by id
    pub fn knowledge_component(&self, kc_id: &str) -> Option<&str> {
        self.knowledge_components.get(kc_id).map(String::as_str)
    }
}
