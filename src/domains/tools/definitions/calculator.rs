//! Calculator tool definition.
//!
//! Basic arithmetic on two operands.

use serde::Deserialize;
use tracing::{info, instrument};

use super::common::success_result;
use crate::domains::tools::descriptor::{ToolHandler, ToolResult};
use crate::domains::tools::schema::{EnumSchema, Field, NumberSchema, ObjectSchema, Schema};
use crate::domains::tools::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    const ALL: [&'static str; 4] = ["add", "subtract", "multiply", "divide"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
        }
    }

    pub fn apply(self, a: f64, b: f64) -> Result<f64, ToolError> {
        let result = match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide if b == 0.0 => {
                return Err(ToolError::execution_failed("Cannot divide by zero"));
            }
            Self::Divide => a / b,
        };
        if result.is_finite() {
            Ok(result)
        } else {
            Err(ToolError::execution_failed("Result is out of range"))
        }
    }
}

/// Parameters for the calculator tool.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculatorArgs {
    pub operation: Operation,
    pub a: f64,
    pub b: f64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Calculator tool - adds, subtracts, multiplies or divides two numbers.
pub struct CalculatorTool;

#[async_trait::async_trait]
impl ToolHandler for CalculatorTool {
    type Args = CalculatorArgs;

    const NAME: &'static str = "calculator";

    const DESCRIPTION: &'static str =
        "Perform basic arithmetic (add, subtract, multiply, divide) on two numbers.";

    fn input_schema() -> Schema {
        ObjectSchema::new()
            .field(Field::required(
                "operation",
                "The arithmetic operation to perform",
                EnumSchema::of(&Operation::ALL),
            ))
            .field(Field::required("a", "First operand", NumberSchema::new()))
            .field(Field::required("b", "Second operand", NumberSchema::new()))
            .into_schema()
    }

    #[instrument(skip_all, fields(operation = args.operation.as_str()))]
    async fn call(&self, args: CalculatorArgs) -> ToolResult {
        let result = args.operation.apply(args.a, args.b)?;
        info!("Calculated {} {} {}", args.a, args.operation.as_str(), args.b);
        Ok(success_result(format!(
            "{} {} {} = {}",
            args.a,
            args.operation.as_str(),
            args.b,
            result
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
