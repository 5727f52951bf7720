//! The single query tool exposed to the model.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::catalog::Module;
use crate::services::ProjectionService;

pub const TOOL_NAME: &str = "get_projection_data";

pub const INVALID_MODULE: &str = "Error: Invalid module specified.";

#[derive(Debug, Error)]
#[error("projection query failed: {0}")]
pub struct ToolError(#[from] sea_orm::DbErr);

/// Arguments as sent by the model. Each field is read on its own, so one
/// badly typed value never discards the others.
#[derive(Debug, Default, PartialEq)]
struct ProjectionArgs {
    module: Option<String>,
    item: Option<String>,
    variable: Option<String>,
    year: Option<i32>,
    region: Option<String>,
}

impl ProjectionArgs {
    fn from_value(args: &Value) -> Self {
        Self {
            module: text_arg(args, "module"),
            item: text_arg(args, "item"),
            variable: text_arg(args, "variable"),
            year: year_arg(args),
            region: text_arg(args, "region"),
        }
    }
}

/// Strings are trimmed, numbers are taken as their decimal text.
fn text_arg(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::String(text) => Some(text.trim().to_string()).filter(|text| !text.is_empty()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Years may arrive as integers, floats or strings. Zero means no year.
fn year_arg(args: &Value) -> Option<i32> {
    let year = match args.get("year")? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64))
            .and_then(|year| i32::try_from(year).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };
    year.filter(|year| *year != 0)
}

/// Sums projection values for the model. Answers with the total, or with
/// [`INVALID_MODULE`] when the module is missing or unknown.
#[derive(Clone)]
pub struct ProjectionTool {
    projections: ProjectionService,
}

impl ProjectionTool {
    pub fn new(projections: ProjectionService) -> Self {
        Self { projections }
    }
}

impl Tool for ProjectionTool {
    const NAME: &'static str = TOOL_NAME;

    type Error = ToolError;
    type Args = Value;
    type Output = Value;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: "Queries the agricultural projection database. Returns the sum of the \
                          value matching the query, or 0 if no data found. All filters are \
                          optional except the module."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "module": {
                        "type": "string",
                        "description": "The module to query. Must be one of: \"crop\", \"animal\", \"bioenergy\", \"landcover\"."
                    },
                    "item": {
                        "type": "string",
                        "description": "The specific item code (e.g., \"wht\" for Wheat, \"ric\" for Rice, \"rum\" for Ruminants)."
                    },
                    "variable": {
                        "type": "string",
                        "description": "The metric code (e.g., \"prod\" for Production, \"yild\" for Yield, \"area\" for Area)."
                    },
                    "year": {
                        "type": "integer",
                        "description": "The projection year (e.g., 2025, 2030)."
                    },
                    "region": {
                        "type": "string",
                        "description": "The region code (e.g., \"ame\" for Americas)."
                    }
                },
                "required": ["module"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<Value, ToolError> {
        let args = ProjectionArgs::from_value(&args);
        debug!("Tool call {} with {:?}", TOOL_NAME, args);

        let module = args
            .module
            .as_deref()
            .and_then(|module| module.to_lowercase().parse::<Module>().ok());
        let Some(module) = module else {
            return Ok(json!(INVALID_MODULE));
        };

        let total = self
            .projections
            .tool_total(
                module,
                args.item.as_deref(),
                args.variable.as_deref(),
                args.year,
                args.region.as_deref(),
            )
            .await?;
        Ok(json!(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::database::entities::{crop_projections, regions, NewProjection};
    use crate::database::test_utils::setup_test_db;
    use sea_orm::ActiveModelTrait;
    use std::sync::Arc;

    async fn tool() -> (ProjectionTool, tempfile::NamedTempFile) {
        let (db, file) = setup_test_db().await;
        let usa = regions::ActiveModel::new("usa", "United States")
            .insert(&db)
            .await
            .unwrap();
        for (year, value) in [(2030, 12.5), (2030, 7.5), (2040, 1.0)] {
            crop_projections::ActiveModel::from_new(&NewProjection {
                uuid: uuid::Uuid::new_v4().to_string(),
                region_id: usa.id,
                year,
                value,
                unit: "t".to_string(),
                item: "wht".to_string(),
                variable: "prod".to_string(),
            })
            .insert(&db)
            .await
            .unwrap();
        }
        let projections = ProjectionService::new(db, Arc::new(Catalog::standard()));
        (ProjectionTool::new(projections), file)
    }

    #[test]
    fn years_are_read_leniently() {
        assert_eq!(year_arg(&json!({"year": 2030.0})), Some(2030));
        assert_eq!(year_arg(&json!({"year": "2025"})), Some(2025));
        assert_eq!(year_arg(&json!({"year": 0})), None);
        assert_eq!(year_arg(&json!({})), None);
    }

    #[test]
    fn badly_typed_fields_keep_the_others() {
        let args = ProjectionArgs::from_value(&json!({"module": "crop", "region": 5, "item": [1]}));
        assert_eq!(args.module.as_deref(), Some("crop"));
        assert_eq!(args.region.as_deref(), Some("5"));
        assert_eq!(args.item, None);
    }

    #[tokio::test]
    async fn definition_requires_module() {
        let (tool, _file) = tool().await;
        let definition = tool.definition(String::new()).await;
        assert_eq!(definition.name, TOOL_NAME);
        assert_eq!(definition.parameters["required"], json!(["module"]));
    }

    #[tokio::test]
    async fn totals_are_summed_for_the_year() {
        let (tool, _file) = tool().await;
        let result = tool
            .call(json!({"module": "Crop", "item": "wht", "year": 2030}))
            .await
            .unwrap();
        assert_eq!(result, json!(20.0));
    }

    #[tokio::test]
    async fn unknown_module_is_reported() {
        let (tool, _file) = tool().await;
        let result = tool.call(json!({"module": "fishery"})).await.unwrap();
        assert_eq!(result, json!(INVALID_MODULE));

        let result = tool.call(json!({"item": "wht"})).await.unwrap();
        assert_eq!(result, json!(INVALID_MODULE));
    }

    #[tokio::test]
    async fn numeric_region_is_not_an_invalid_module() {
        let (tool, _file) = tool().await;
        let result = tool.call(json!({"module": "crop", "region": 5})).await.unwrap();
        assert_eq!(result, json!(0.0));
    }

    #[tokio::test]
    async fn unknown_region_sums_to_zero() {
        let (tool, _file) = tool().await;
        let result = tool
            .call(json!({"module": "crop", "region": "atlantis"}))
            .await
            .unwrap();
        assert_eq!(result, json!(0.0));
    }
}
