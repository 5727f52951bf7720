use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Module};
use crate::database::open_database;
use crate::database::entities::{
    animal_projections, bioenergy_projections, crop_projections, land_cover_projections, regions,
    NewProjection,
};
use crate::errors::{IngestError, IngestResult};

/// Records per table buffered before an `insert_many`.
pub const BATCH_SIZE: usize = 1000;

/// One line of the projection export. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    region: String,
    item: String,
    variable: String,
    year: i32,
    value: f64,
    unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IngestSummary {
    /// Regions created by this run
    pub regions: usize,
    pub records: IndexMap<Module, usize>,
    pub skipped: usize,
}

impl IngestSummary {
    fn new() -> Self {
        Self {
            regions: 0,
            records: Module::ALL.into_iter().map(|module| (module, 0)).collect(),
            skipped: 0,
        }
    }

    pub fn records_for(&self, module: Module) -> usize {
        self.records.get(&module).copied().unwrap_or(0)
    }

    pub fn total_records(&self) -> usize {
        self.records.values().sum()
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Regions: {}", self.regions)?;
        for (module, count) in &self.records {
            writeln!(f, "{}: {}", module.display_name(), count)?;
        }
        write!(f, "Skipped: {}", self.skipped)
    }
}

/// Loads a projection CSV export into the store.
pub struct IngestService {
    db: DatabaseConnection,
    catalog: Arc<Catalog>,
}

impl IngestService {
    pub fn new(db: DatabaseConnection, catalog: Arc<Catalog>) -> Self {
        Self { db, catalog }
    }

    /// Ingests `path` in a single transaction. With `clear`, existing
    /// projections and regions are removed inside the same transaction.
    pub async fn ingest_csv(&self, path: &Path, clear: bool) -> IngestResult<IngestSummary> {
        if !path.exists() {
            return Err(IngestError::FileNotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let txn = self.db.begin().await?;

        if clear {
            info!("Clearing existing projection data");
            clear_store(&txn).await?;
        }

        info!("Reading projections from {}", path.display());
        let summary = self.load_rows(&txn, &mut reader).await?;
        txn.commit().await?;

        info!(
            "Ingestion complete: {} regions, {} records, {} skipped",
            summary.regions,
            summary.total_records(),
            summary.skipped
        );
        Ok(summary)
    }

    async fn load_rows<R: std::io::Read>(
        &self,
        txn: &DatabaseTransaction,
        reader: &mut csv::Reader<R>,
    ) -> IngestResult<IngestSummary> {
        let mut summary = IngestSummary::new();
        let mut region_ids: HashMap<String, i32> = HashMap::new();
        let mut batches: HashMap<Module, Vec<NewProjection>> = HashMap::new();

        for row in reader.deserialize::<CsvRow>() {
            let row = row?;

            let Some(module) = self.catalog.module_for(&row.item, &row.variable) else {
                debug!("No table for item '{}' variable '{}'", row.item, row.variable);
                summary.skipped += 1;
                continue;
            };

            if !self.catalog.has_item(module, &row.item) {
                warn!("Invalid item '{}' for {}, skipping", row.item, module);
                summary.skipped += 1;
                continue;
            }
            if !self.catalog.has_variable(module, &row.variable) {
                warn!("Invalid variable '{}' for {}, skipping", row.variable, module);
                summary.skipped += 1;
                continue;
            }

            let Some((value, unit)) = self.catalog.normalize_unit(row.value, &row.unit) else {
                warn!("Unknown unit '{}' for {}, skipping", row.unit, row.item);
                summary.skipped += 1;
                continue;
            };

            let region_id = match region_ids.get(&row.region) {
                Some(id) => *id,
                None => {
                    let (id, created) = self.get_or_create_region(txn, &row.region).await?;
                    if created {
                        summary.regions += 1;
                    }
                    region_ids.insert(row.region.clone(), id);
                    id
                }
            };

            let batch = batches.entry(module).or_default();
            batch.push(NewProjection {
                uuid: uuid::Uuid::new_v4().to_string(),
                region_id,
                year: row.year,
                value,
                unit: unit.to_string(),
                item: row.item,
                variable: row.variable,
            });

            if batch.len() >= BATCH_SIZE {
                insert_batch(txn, module, batch).await?;
                *summary.records.entry(module).or_insert(0) += batch.len();
                batch.clear();
            }
        }

        for (module, batch) in batches {
            if !batch.is_empty() {
                insert_batch(txn, module, &batch).await?;
                *summary.records.entry(module).or_insert(0) += batch.len();
            }
        }

        Ok(summary)
    }

    async fn get_or_create_region(
        &self,
        txn: &DatabaseTransaction,
        code: &str,
    ) -> Result<(i32, bool), DbErr> {
        if let Some(region) = regions::Entity::find()
            .filter(regions::Column::Code.eq(code))
            .one(txn)
            .await?
        {
            return Ok((region.id, false));
        }

        let region = regions::ActiveModel::new(code, self.catalog.region_name(code))
            .insert(txn)
            .await?;
        debug!("Created region {} ({})", region.code, region.name);
        Ok((region.id, true))
    }
}

/// Loads `path` into the SQLite file at `database_path`. The CSV is checked
/// before the database is opened, so a missing file leaves no database behind.
pub async fn ingest_into(
    database_path: &str,
    path: &Path,
    clear: bool,
    catalog: Arc<Catalog>,
) -> IngestResult<IngestSummary> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.display().to_string()));
    }

    let db = open_database(database_path).await?;
    IngestService::new(db, catalog).ingest_csv(path, clear).await
}

async fn insert_batch<C: ConnectionTrait>(
    conn: &C,
    module: Module,
    batch: &[NewProjection],
) -> Result<(), DbErr> {
    debug!("Inserting {} {} records", batch.len(), module);
    match module {
        Module::Crop => {
            crop_projections::Entity::insert_many(
                batch.iter().map(crop_projections::ActiveModel::from_new),
            )
            .exec(conn)
            .await?;
        }
        Module::Animal => {
            animal_projections::Entity::insert_many(
                batch.iter().map(animal_projections::ActiveModel::from_new),
            )
            .exec(conn)
            .await?;
        }
        Module::Bioenergy => {
            bioenergy_projections::Entity::insert_many(
                batch.iter().map(bioenergy_projections::ActiveModel::from_new),
            )
            .exec(conn)
            .await?;
        }
        Module::LandCover => {
            land_cover_projections::Entity::insert_many(
                batch.iter().map(land_cover_projections::ActiveModel::from_new),
            )
            .exec(conn)
            .await?;
        }
    }
    Ok(())
}

/// Projections go first, regions are protected by their foreign keys.
async fn clear_store<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    crop_projections::Entity::delete_many().exec(conn).await?;
    animal_projections::Entity::delete_many().exec(conn).await?;
    bioenergy_projections::Entity::delete_many().exec(conn).await?;
    land_cover_projections::Entity::delete_many().exec(conn).await?;
    regions::Entity::delete_many().exec(conn).await?;
    Ok(())
}
