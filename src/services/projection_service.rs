use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::catalog::{Catalog, Module, HEADLINE_VARIABLES};
use crate::database::entities::{
    animal_projections, bioenergy_projections, crop_projections, land_cover_projections, regions,
    ProjectionColumns, ProjectionRow,
};
use crate::errors::{ApiError, ApiResult};

/// Runs `$body` with `$entity` bound to the table of `$module`.
macro_rules! with_entity {
    ($module:expr, $entity:ident => $body:expr) => {
        match $module {
            Module::Crop => {
                type $entity = crop_projections::Entity;
                $body
            }
            Module::Animal => {
                type $entity = animal_projections::Entity;
                $body
            }
            Module::Bioenergy => {
                type $entity = bioenergy_projections::Entity;
                $body
            }
            Module::LandCover => {
                type $entity = land_cover_projections::Entity;
                $body
            }
        }
    };
}

/// Raw query-string filters shared by the projection and chart endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProjectionParams {
    /// One of crop, animal, bioenergy, landcover
    pub module: Option<String>,
    pub region: Option<String>,
    pub item: Option<String>,
    pub variable: Option<String>,
    /// Inclusive lower bound
    pub year_start: Option<String>,
    /// Inclusive upper bound
    pub year_end: Option<String>,
}

/// Filters ANDed onto a projection table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionFilter {
    pub region_id: Option<i32>,
    pub item: Option<String>,
    pub variable: Option<String>,
    pub year_start: Option<i32>,
    pub year_end: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionQuery {
    pub module: Module,
    pub filter: ProjectionFilter,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegionSummary {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProjectionRecord {
    pub uuid: String,
    pub region: String,
    pub region_name: String,
    pub year: i32,
    pub item: String,
    pub item_label: String,
    pub variable: String,
    pub variable_label: String,
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct YearTotal {
    pub year: i32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromQueryResult)]
pub struct ItemTotal {
    pub item: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineStat {
    pub code: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub total: f64,
}

#[derive(Debug, FromQueryResult)]
struct TotalRow {
    total: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct VariableTotal {
    variable: String,
    total: Option<f64>,
}

/// Read side of the projection store.
#[derive(Clone)]
pub struct ProjectionService {
    db: DatabaseConnection,
    catalog: Arc<Catalog>,
}

impl ProjectionService {
    pub fn new(db: DatabaseConnection, catalog: Arc<Catalog>) -> Self {
        Self { db, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Turns raw parameters into a typed query, or a validation error that
    /// names the offending parameter.
    pub async fn validate(&self, params: &ProjectionParams) -> ApiResult<ProjectionQuery> {
        let module_code = present(&params.module)
            .ok_or_else(|| ApiError::validation("Missing required parameter: module"))?;
        let module: Module = module_code
            .parse()
            .map_err(|err: crate::catalog::UnknownModule| ApiError::validation(err.to_string()))?;

        let item = present(&params.item);
        if let Some(item) = item {
            if !self.catalog.has_item(module, item) {
                return Err(ApiError::validation(format!(
                    "Invalid item '{}' for module '{}'. Valid options: {}",
                    item,
                    module,
                    self.catalog.item_codes(module).join(", ")
                )));
            }
        }

        let variable = present(&params.variable);
        if let Some(variable) = variable {
            if !self.catalog.has_variable(module, variable) {
                return Err(ApiError::validation(format!(
                    "Invalid variable '{}' for module '{}'. Valid options: {}",
                    variable,
                    module,
                    self.catalog.variable_codes(module).join(", ")
                )));
            }
        }

        let region_id = match present(&params.region) {
            Some(code) => match self.region_id(code).await? {
                Some(id) => Some(id),
                None => {
                    let codes: Vec<String> =
                        self.regions().await?.into_iter().map(|r| r.code).collect();
                    return Err(ApiError::validation(format!(
                        "Invalid region '{}'. Valid options: {}",
                        code,
                        codes.join(", ")
                    )));
                }
            },
            None => None,
        };

        let year_start = parse_year(&params.year_start, "year_start")?;
        let year_end = parse_year(&params.year_end, "year_end")?;
        if let (Some(start), Some(end)) = (year_start, year_end) {
            if start > end {
                return Err(ApiError::validation(
                    "year_start cannot be greater than year_end",
                ));
            }
        }

        Ok(ProjectionQuery {
            module,
            filter: ProjectionFilter {
                region_id,
                item: item.map(str::to_string),
                variable: variable.map(str::to_string),
                year_start,
                year_end,
            },
        })
    }

    /// All regions ordered by code.
    pub async fn regions(&self) -> Result<Vec<RegionSummary>, DbErr> {
        let regions = regions::Entity::find()
            .order_by_asc(regions::Column::Code)
            .all(&self.db)
            .await?;
        Ok(regions
            .into_iter()
            .map(|region| RegionSummary {
                code: region.code,
                name: region.name,
            })
            .collect())
    }

    pub async fn region_id(&self, code: &str) -> Result<Option<i32>, DbErr> {
        Ok(regions::Entity::find()
            .filter(regions::Column::Code.eq(code))
            .one(&self.db)
            .await?
            .map(|region| region.id))
    }

    /// Matching records ordered by region code, item, variable and year.
    pub async fn list(&self, query: &ProjectionQuery) -> Result<Vec<ProjectionRecord>, DbErr> {
        debug!("Listing {} projections with {:?}", query.module, query.filter);
        let rows: Vec<ProjectionRow> = with_entity!(query.module, E => {
            filtered::<E>(&query.filter)
                .order_by_asc(E::region_id())
                .order_by_asc(E::item())
                .order_by_asc(E::variable())
                .order_by_asc(E::year())
                .into_model::<ProjectionRow>()
                .all(&self.db)
                .await?
        });

        let regions: HashMap<i32, regions::Model> = regions::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|region| (region.id, region))
            .collect();

        let mut records: Vec<ProjectionRecord> = rows
            .into_iter()
            .map(|row| {
                let (region, region_name) = match regions.get(&row.region_id) {
                    Some(region) => (region.code.clone(), region.name.clone()),
                    None => (String::new(), String::new()),
                };
                ProjectionRecord {
                    uuid: row.uuid,
                    region,
                    region_name,
                    year: row.year,
                    item_label: self.item_label(query.module, &row.item),
                    item: row.item,
                    variable_label: self.variable_label(query.module, &row.variable),
                    variable: row.variable,
                    value: row.value,
                    unit: row.unit,
                }
            })
            .collect();

        // Region ids follow insertion order. Rows are already sorted by item,
        // variable and year within a region, so a stable sort on the code is enough.
        records.sort_by(|a, b| a.region.cmp(&b.region));
        Ok(records)
    }

    /// Sum of `value` over the filtered table; zero when nothing matches.
    pub async fn sum_total(&self, query: &ProjectionQuery) -> Result<f64, DbErr> {
        let row = with_entity!(query.module, E => {
            filtered::<E>(&query.filter)
                .select_only()
                .column_as(E::value().sum(), "total")
                .into_model::<TotalRow>()
                .one(&self.db)
                .await?
        });
        Ok(row.and_then(|row| row.total).unwrap_or(0.0))
    }

    /// Per-year sums, ascending by year.
    pub async fn sum_by_year(&self, query: &ProjectionQuery) -> Result<Vec<YearTotal>, DbErr> {
        Ok(with_entity!(query.module, E => {
            filtered::<E>(&query.filter)
                .select_only()
                .column(E::year())
                .column_as(E::value().sum(), "total")
                .group_by(E::year())
                .order_by_asc(E::year())
                .into_model::<YearTotal>()
                .all(&self.db)
                .await?
        }))
    }

    /// Per-item sums, ascending by item code.
    pub async fn sum_by_item(&self, query: &ProjectionQuery) -> Result<Vec<ItemTotal>, DbErr> {
        Ok(with_entity!(query.module, E => {
            filtered::<E>(&query.filter)
                .select_only()
                .column(E::item())
                .column_as(E::value().sum(), "total")
                .group_by(E::item())
                .order_by_asc(E::item())
                .into_model::<ItemTotal>()
                .all(&self.db)
                .await?
        }))
    }

    /// Landing-page totals of the headline variables across all four tables.
    pub async fn headline_stats(&self) -> Result<Vec<HeadlineStat>, DbErr> {
        let codes: Vec<&str> = HEADLINE_VARIABLES.iter().map(|(code, _, _)| *code).collect();
        let mut totals: IndexMap<String, f64> = IndexMap::new();

        for module in Module::ALL {
            let rows = with_entity!(module, E => {
                E::find()
                    .select_only()
                    .column(E::variable())
                    .column_as(E::value().sum(), "total")
                    .filter(E::variable().is_in(codes.clone()))
                    .group_by(E::variable())
                    .into_model::<VariableTotal>()
                    .all(&self.db)
                    .await?
            });
            for row in rows {
                if let Some(total) = row.total {
                    *totals.entry(row.variable).or_insert(0.0) += total;
                }
            }
        }

        Ok(HEADLINE_VARIABLES
            .iter()
            .map(|&(code, label, unit)| HeadlineStat {
                code,
                label,
                unit,
                total: totals.get(code).copied().unwrap_or(0.0),
            })
            .collect())
    }

    /// Sum used by the assistant tool. Item and variable are matched as given;
    /// an unknown region matches nothing.
    pub async fn tool_total(
        &self,
        module: Module,
        item: Option<&str>,
        variable: Option<&str>,
        year: Option<i32>,
        region: Option<&str>,
    ) -> Result<f64, DbErr> {
        let region_id = match region {
            Some(code) => match self.region_id(code).await? {
                Some(id) => Some(id),
                None => return Ok(0.0),
            },
            None => None,
        };

        let query = ProjectionQuery {
            module,
            filter: ProjectionFilter {
                region_id,
                item: item.map(str::to_string),
                variable: variable.map(str::to_string),
                year_start: year,
                year_end: year,
            },
        };
        self.sum_total(&query).await
    }

    fn item_label(&self, module: Module, code: &str) -> String {
        self.catalog
            .item_label(module, code)
            .unwrap_or(code)
            .to_string()
    }

    fn variable_label(&self, module: Module, code: &str) -> String {
        self.catalog
            .variable_label(module, code)
            .unwrap_or(code)
            .to_string()
    }
}

fn filtered<E: ProjectionColumns>(filter: &ProjectionFilter) -> Select<E> {
    let mut select = E::find();
    if let Some(region_id) = filter.region_id {
        select = select.filter(E::region_id().eq(region_id));
    }
    if let Some(item) = &filter.item {
        select = select.filter(E::item().eq(item.as_str()));
    }
    if let Some(variable) = &filter.variable {
        select = select.filter(E::variable().eq(variable.as_str()));
    }
    if let Some(start) = filter.year_start {
        select = select.filter(E::year().gte(start));
    }
    if let Some(end) = filter.year_end {
        select = select.filter(E::year().lte(end));
    }
    select
}

/// Empty query-string values count as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_year(value: &Option<String>, name: &str) -> ApiResult<Option<i32>> {
    match present(value) {
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| ApiError::validation(format!("{} must be an integer", name))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::entities::NewProjection;
    use crate::database::test_utils::setup_test_db;
    use sea_orm::ActiveModelTrait;

    async fn seed(db: &DatabaseConnection) {
        let usa = regions::ActiveModel::new("usa", "United States")
            .insert(db)
            .await
            .unwrap();
        let chn = regions::ActiveModel::new("chn", "China")
            .insert(db)
            .await
            .unwrap();

        let crop = [
            (usa.id, "wht", "prod", 2020, 10.0, "t"),
            (usa.id, "wht", "prod", 2030, 20.0, "t"),
            (usa.id, "ric", "prod", 2020, 5.0, "t"),
            (chn.id, "ric", "prod", 2020, 7.0, "t"),
            (usa.id, "wht", "yild", 2020, 3.0, "t/ha"),
        ];
        for (region_id, item, variable, year, value, unit) in crop {
            crop_projections::ActiveModel::from_new(&NewProjection {
                uuid: uuid::Uuid::new_v4().to_string(),
                region_id,
                year,
                value,
                unit: unit.to_string(),
                item: item.to_string(),
                variable: variable.to_string(),
            })
            .insert(db)
            .await
            .unwrap();
        }

        animal_projections::ActiveModel::from_new(&NewProjection {
            uuid: uuid::Uuid::new_v4().to_string(),
            region_id: usa.id,
            year: 2020,
            value: 4.0,
            unit: "t".to_string(),
            item: "rum".to_string(),
            variable: "prod".to_string(),
        })
        .insert(db)
        .await
        .unwrap();
    }

    fn params(pairs: &[(&str, &str)]) -> ProjectionParams {
        let mut params = ProjectionParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "module" => params.module = value,
                "region" => params.region = value,
                "item" => params.item = value,
                "variable" => params.variable = value,
                "year_start" => params.year_start = value,
                "year_end" => params.year_end = value,
                _ => unreachable!(),
            }
        }
        params
    }

    async fn service() -> (ProjectionService, tempfile::NamedTempFile) {
        let (db, file) = setup_test_db().await;
        seed(&db).await;
        (ProjectionService::new(db, Arc::new(Catalog::standard())), file)
    }

    #[tokio::test]
    async fn validation_messages_name_the_parameter() {
        let (service, _file) = service().await;

        let cases = [
            (params(&[]), "Missing required parameter: module"),
            (
                params(&[("module", "fish")]),
                "Invalid module 'fish'. Valid options: crop, animal, bioenergy, landcover",
            ),
            (
                params(&[("module", "crop"), ("item", "rum")]),
                "Invalid item 'rum' for module 'crop'. Valid options: wht, ric, cgr, osd, vfn",
            ),
            (
                params(&[("module", "crop"), ("region", "xyz")]),
                "Invalid region 'xyz'. Valid options: chn, usa",
            ),
            (
                params(&[("module", "crop"), ("year_start", "abc")]),
                "year_start must be an integer",
            ),
            (
                params(&[("module", "crop"), ("year_end", "abc")]),
                "year_end must be an integer",
            ),
            (
                params(&[("module", "crop"), ("year_start", "2030"), ("year_end", "2020")]),
                "year_start cannot be greater than year_end",
            ),
        ];

        for (params, expected) in cases {
            let err = service.validate(&params).await.unwrap_err();
            assert!(err.is_client_error());
            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn empty_values_are_ignored() {
        let (service, _file) = service().await;
        let query = service
            .validate(&params(&[("module", "crop"), ("item", ""), ("year_start", "")]))
            .await
            .unwrap();
        assert_eq!(query.filter, ProjectionFilter::default());
    }

    #[tokio::test]
    async fn list_is_ordered_and_labelled() {
        let (service, _file) = service().await;
        let query = service
            .validate(&params(&[("module", "crop"), ("region", "usa"), ("variable", "prod")]))
            .await
            .unwrap();

        let records = service.list(&query).await.unwrap();
        let keys: Vec<(&str, i32)> = records.iter().map(|r| (r.item.as_str(), r.year)).collect();
        assert_eq!(keys, vec![("ric", 2020), ("wht", 2020), ("wht", 2030)]);
        assert_eq!(records[0].item_label, "Rice");
        assert_eq!(records[0].variable_label, "Production");
        assert_eq!(records[0].region_name, "United States");
    }

    #[tokio::test]
    async fn list_orders_regions_by_code_not_insertion() {
        let (service, _file) = service().await;
        let query = service
            .validate(&params(&[("module", "crop"), ("variable", "prod"), ("year_end", "2020")]))
            .await
            .unwrap();

        let records = service.list(&query).await.unwrap();
        let keys: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.region.as_str(), r.item.as_str()))
            .collect();
        assert_eq!(keys, vec![("chn", "ric"), ("usa", "ric"), ("usa", "wht")]);
    }

    #[tokio::test]
    async fn sums_group_by_year_and_item() {
        let (service, _file) = service().await;
        let query = service
            .validate(&params(&[("module", "crop"), ("variable", "prod")]))
            .await
            .unwrap();

        assert_eq!(service.sum_total(&query).await.unwrap(), 42.0);
        assert_eq!(
            service.sum_by_year(&query).await.unwrap(),
            vec![
                YearTotal { year: 2020, total: 22.0 },
                YearTotal { year: 2030, total: 20.0 },
            ]
        );
        assert_eq!(
            service.sum_by_item(&query).await.unwrap(),
            vec![
                ItemTotal { item: "ric".to_string(), total: 12.0 },
                ItemTotal { item: "wht".to_string(), total: 30.0 },
            ]
        );
    }

    #[tokio::test]
    async fn headline_stats_sum_across_tables() {
        let (service, _file) = service().await;
        let stats = service.headline_stats().await.unwrap();

        let prod = stats.iter().find(|s| s.code == "prod").unwrap();
        assert_eq!(prod.total, 46.0);
        assert_eq!(prod.unit, "t");
        let cons = stats.iter().find(|s| s.code == "cons").unwrap();
        assert_eq!(cons.total, 0.0);
    }

    #[tokio::test]
    async fn headline_stats_on_empty_store_are_zero() {
        let (db, _file) = setup_test_db().await;
        let service = ProjectionService::new(db, Arc::new(Catalog::standard()));
        let stats = service.headline_stats().await.unwrap();
        assert_eq!(stats.len(), 4);
        assert!(stats.iter().all(|s| s.total == 0.0));
    }

    #[tokio::test]
    async fn tool_total_treats_unknown_region_as_empty() {
        let (service, _file) = service().await;
        let total = service
            .tool_total(Module::Crop, Some("wht"), Some("prod"), Some(2030), Some("usa"))
            .await
            .unwrap();
        assert_eq!(total, 20.0);

        let total = service
            .tool_total(Module::Crop, None, None, None, Some("atlantis"))
            .await
            .unwrap();
        assert_eq!(total, 0.0);
    }
}
