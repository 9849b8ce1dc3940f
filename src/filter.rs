//! Comparison operators from the URL and the predicates they translate to.

use crate::error::AppError;
use crate::schema::ResolvedField;
use crate::sql::BindValue;
use serde::Deserialize;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Lt,
    Ge,
    Le,
    Ne,
    Between,
    Like,
}

impl Operator {
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Ne => "!=",
            Operator::Between => "between",
            Operator::Like => "like",
        }
    }
}

impl FromStr for Operator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "=" => Operator::Eq,
            ">" => Operator::Gt,
            "<" => Operator::Lt,
            ">=" => Operator::Ge,
            "<=" => Operator::Le,
            "!=" => Operator::Ne,
            "between" => Operator::Between,
            "like" => Operator::Like,
            _ => return Err(AppError::InvalidOperator(s.to_string())),
        })
    }
}

/// Query-string operands of a comparison request. Which ones are read depends on the operator.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Operands {
    pub value: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    /// One of `=`, `>`, `<`, `>=`, `<=`, `!=` against a single value.
    Compare(Operator, BindValue),
    /// Inclusive range.
    Between(BindValue, BindValue),
    Like(String),
}

/// A condition on one schema field. The column always comes from the resolved schema.
#[derive(Clone, Debug, PartialEq)]
pub struct Predicate<'a> {
    pub field: &'a ResolvedField,
    pub condition: Condition,
}

fn required<'o>(operand: &'o Option<String>, name: &'static str) -> Result<&'o str, AppError> {
    operand.as_deref().ok_or(AppError::MissingOperand(name))
}

impl<'a> Predicate<'a> {
    /// Exact match, used by fetch-by-property.
    pub fn equals(field: &'a ResolvedField, raw: &str) -> Result<Self, AppError> {
        Ok(Predicate {
            field,
            condition: Condition::Compare(Operator::Eq, BindValue::parse(raw, field)?),
        })
    }

    pub fn compare(field: &'a ResolvedField, op: Operator, operands: &Operands) -> Result<Self, AppError> {
        let condition = match op {
            Operator::Between => {
                let from = BindValue::parse(required(&operands.from, "from")?, field)?;
                let to = BindValue::parse(required(&operands.to, "to")?, field)?;
                Condition::Between(from, to)
            }
            Operator::Like => Condition::Like(required(&operands.pattern, "pattern")?.to_string()),
            _ => Condition::Compare(op, BindValue::parse(required(&operands.value, "value")?, field)?),
        };
        Ok(Predicate { field, condition })
    }
}
