//! Four-operation arithmetic calculator tool.
//!
//! Division follows IEEE 754 float semantics: dividing by zero yields
//! ±infinity (or NaN for 0/0) instead of raising an error. `serde_json`
//! has no representation for non-finite numbers, so those results
//! serialize as `null` in tool output, matching the behavior of the
//! platform this engine replaces.

use serde::Deserialize;
use serde_json::{Value, json};

use super::ToolDefinition;

/// Arithmetic operation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// `number1 + number2`
    Add,
    /// `number1 - number2`
    Subtract,
    /// `number1 * number2`
    Multiply,
    /// `number1 / number2` (IEEE semantics, never errors)
    Divide,
}

/// Validated calculator arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculatorArgs {
    /// The operation to perform.
    pub operation: Operation,
    /// The first operand.
    pub number1: f64,
    /// The second operand.
    pub number2: f64,
}

/// Evaluates one arithmetic operation.
#[must_use]
pub fn evaluate(operation: Operation, number1: f64, number2: f64) -> f64 {
    match operation {
        Operation::Add => number1 + number2,
        Operation::Subtract => number1 - number2,
        Operation::Multiply => number1 * number2,
        Operation::Divide => number1 / number2,
    }
}

/// Invokes the calculator with validated arguments.
///
/// Whole finite results serialize as integers so `2 + 3` reads as `5`,
/// not `5.0`, in the aggregated answer.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn invoke(args: &CalculatorArgs) -> Value {
    let result = evaluate(args.operation, args.number1, args.number2);
    if result.is_finite() && result.fract() == 0.0 && result.abs() < 9_007_199_254_740_992.0 {
        json!(result as i64)
    } else {
        // Non-finite values map to null (no JSON representation).
        Value::from(result)
    }
}

/// Defines the `calculator` tool.
pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "calculator".to_string(),
        description: "A calculator tool that can perform basic arithmetic operations \
                       (add, subtract, multiply, divide) on two numbers. Use this for \
                       mathematical calculations like '3 + 3' or 'what is 5 times 7'."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["add", "subtract", "multiply", "divide"],
                    "description": "The operation to perform."
                },
                "number1": {
                    "type": "number",
                    "description": "The first number."
                },
                "number2": {
                    "type": "number",
                    "description": "The second number."
                }
            },
            "required": ["operation", "number1", "number2"],
            "additionalProperties": false
        }),
    }
}
