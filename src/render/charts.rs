//! Plotly figure specs built from the aggregate queries.

use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::errors::ApiResult;
use crate::services::{ItemTotal, ProjectionQuery, YearTotal};

/// Human-readable description of the slice a chart shows.
pub fn describe(catalog: &Catalog, query: &ProjectionQuery, region: Option<&str>) -> String {
    let module = query.module;
    let mut parts = vec![module.display_name().to_string()];

    if let Some(variable) = &query.filter.variable {
        parts.push(
            catalog
                .variable_label(module, variable)
                .unwrap_or(variable)
                .to_string(),
        );
    }
    if let Some(item) = &query.filter.item {
        parts.push(catalog.item_label(module, item).unwrap_or(item).to_string());
    }
    if let Some(region) = region {
        parts.push(catalog.region_name(region).to_string());
    }
    match (query.filter.year_start, query.filter.year_end) {
        (Some(start), Some(end)) => parts.push(format!("{}-{}", start, end)),
        (Some(start), None) => parts.push(format!("from {}", start)),
        (None, Some(end)) => parts.push(format!("until {}", end)),
        (None, None) => {}
    }

    parts.join(" / ")
}

/// Line chart of the yearly sums. `None` when there is nothing to plot.
pub fn timeseries_figure(title: &str, totals: &[YearTotal]) -> Option<Value> {
    if totals.is_empty() {
        return None;
    }

    let years: Vec<i32> = totals.iter().map(|t| t.year).collect();
    let values: Vec<f64> = totals.iter().map(|t| t.total).collect();

    Some(json!({
        "data": [{
            "type": "scatter",
            "mode": "lines+markers",
            "x": years,
            "y": values,
            "line": { "color": "#15803d" },
        }],
        "layout": {
            "title": { "text": title },
            "xaxis": { "title": { "text": "Year" } },
            "yaxis": { "title": { "text": "Value" } },
            "margin": { "t": 60, "r": 20, "b": 50, "l": 70 },
        },
    }))
}

/// Pie chart of the per-item sums, labelled with item names.
pub fn breakdown_figure(
    catalog: &Catalog,
    query: &ProjectionQuery,
    title: &str,
    totals: &[ItemTotal],
) -> Option<Value> {
    if totals.is_empty() {
        return None;
    }

    let labels: Vec<&str> = totals
        .iter()
        .map(|t| catalog.item_label(query.module, &t.item).unwrap_or(&t.item))
        .collect();
    let values: Vec<f64> = totals.iter().map(|t| t.total).collect();

    Some(json!({
        "data": [{
            "type": "pie",
            "labels": labels,
            "values": values,
            "hole": 0.3,
        }],
        "layout": {
            "title": { "text": title },
            "margin": { "t": 60, "r": 20, "b": 20, "l": 20 },
        },
    }))
}

/// Serializes a figure for inlining into a `<script>` element.
pub fn script_json(figure: &Value) -> ApiResult<String> {
    Ok(serde_json::to_string(figure)?.replace("</", "<\\/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Module;
    use crate::services::ProjectionFilter;

    fn query(filter: ProjectionFilter) -> ProjectionQuery {
        ProjectionQuery {
            module: Module::Crop,
            filter,
        }
    }

    #[test]
    fn description_uses_labels() {
        let catalog = Catalog::standard();
        let query = query(ProjectionFilter {
            item: Some("wht".to_string()),
            variable: Some("prod".to_string()),
            year_start: Some(2020),
            year_end: Some(2050),
            ..Default::default()
        });
        assert_eq!(
            describe(&catalog, &query, Some("usa")),
            "Crop Module Projection / Production / Wheat / United States / 2020-2050"
        );
    }

    #[test]
    fn empty_totals_have_no_figure() {
        let catalog = Catalog::standard();
        assert!(timeseries_figure("t", &[]).is_none());
        assert!(breakdown_figure(&catalog, &query(Default::default()), "t", &[]).is_none());
    }

    #[test]
    fn timeseries_plots_years_against_sums() {
        let figure = timeseries_figure(
            "Wheat",
            &[
                YearTotal { year: 2020, total: 1.0 },
                YearTotal { year: 2030, total: 2.5 },
            ],
        )
        .unwrap();
        assert_eq!(figure["data"][0]["x"], json!([2020, 2030]));
        assert_eq!(figure["data"][0]["y"], json!([1.0, 2.5]));
        assert_eq!(figure["layout"]["title"]["text"], "Wheat");
    }

    #[test]
    fn breakdown_labels_items() {
        let catalog = Catalog::standard();
        let figure = breakdown_figure(
            &catalog,
            &query(Default::default()),
            "Crops",
            &[ItemTotal { item: "ric".to_string(), total: 3.0 }],
        )
        .unwrap();
        assert_eq!(figure["data"][0]["labels"], json!(["Rice"]));
        assert_eq!(figure["data"][0]["type"], "pie");
    }
}
