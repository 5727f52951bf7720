//! HTML rendering for the dashboard page and chart fragments.

pub mod charts;

use std::sync::Arc;

use handlebars::{handlebars_helper, Handlebars, TemplateError};
use serde::Serialize;
use serde_json::{json, Value};

use crate::catalog::ModuleInfo;
use crate::errors::ApiResult;
use crate::services::{HeadlineStat, RegionSummary};

pub const NO_DATA: &str = "No data available for the selected filters.";

pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();

    handlebars_helper!(format_number: |v: f64| group_thousands(v));
    handlebars.register_helper("format_number", Box::new(format_number));

    handlebars
}

/// Formats with two decimals and comma thousands separators.
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

#[derive(Debug, Serialize)]
struct DashboardContext<'a> {
    headline_stats: &'a [HeadlineStat],
    modules: &'a [ModuleInfo],
    regions: &'a [RegionSummary],
    default_module: &'a str,
}

/// Template registry built once at start-up and shared by all handlers.
#[derive(Clone)]
pub struct Renderer {
    handlebars: Arc<Handlebars<'static>>,
}

impl Renderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut handlebars = get_handlebars();
        handlebars.register_template_string("dashboard", include_str!("dashboard.hbs"))?;
        handlebars.register_template_string("chart", include_str!("chart.hbs"))?;
        handlebars.register_template_string("charts", include_str!("charts.hbs"))?;
        handlebars.register_template_string("no_data", include_str!("no_data.hbs"))?;

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    pub fn dashboard(
        &self,
        headline_stats: &[HeadlineStat],
        modules: &[ModuleInfo],
        regions: &[RegionSummary],
    ) -> ApiResult<String> {
        let context = DashboardContext {
            headline_stats,
            modules,
            regions,
            default_module: modules.first().map(|m| m.name.as_str()).unwrap_or("crop"),
        };
        Ok(self.handlebars.render("dashboard", &context)?)
    }

    /// Embeddable Plotly chart, or the no-data placeholder for `None`.
    pub fn chart(&self, figure: Option<&Value>) -> ApiResult<String> {
        let Some(figure) = figure else {
            return Ok(self
                .handlebars
                .render("no_data", &json!({ "message": NO_DATA }))?);
        };

        let id = format!("chart-{}", uuid::Uuid::new_v4().simple());
        Ok(self.handlebars.render(
            "chart",
            &json!({
                "id": id,
                "height": 420,
                "figure": charts::script_json(figure)?,
            }),
        )?)
    }

    pub fn charts(&self, timeseries: &str, breakdown: &str) -> ApiResult<String> {
        Ok(self.handlebars.render(
            "charts",
            &json!({ "timeseries": timeseries, "breakdown": breakdown }),
        )?)
    }
}
