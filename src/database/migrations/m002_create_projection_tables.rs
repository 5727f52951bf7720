use sea_orm_migration::prelude::*;

use crate::catalog::{Module, UNITS};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for module in Module::ALL {
            let table = Alias::new(module.table_name());

            manager
                .create_table(
                    Table::create()
                        .table(table.clone())
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Projection::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Projection::Uuid)
                                .string_len(36)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Projection::RegionId).integer().not_null())
                        .col(ColumnDef::new(Projection::Year).integer().not_null())
                        .col(ColumnDef::new(Projection::Value).double().not_null())
                        .col(ColumnDef::new(Projection::Unit).string_len(10).not_null())
                        .col(ColumnDef::new(Projection::Item).string_len(10).not_null())
                        .col(ColumnDef::new(Projection::Variable).string_len(10).not_null())
                        .check(Expr::col(Projection::Unit).is_in(codes(UNITS)))
                        .check(Expr::col(Projection::Item).is_in(codes(module.items())))
                        .check(Expr::col(Projection::Variable).is_in(codes(module.variables())))
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{}_region_id", module.table_name()))
                                .from(table.clone(), Projection::RegionId)
                                .to(Regions::Table, Regions::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_region_item_year", module.table_name()))
                        .table(table.clone())
                        .col(Projection::RegionId)
                        .col(Projection::Item)
                        .col(Projection::Year)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{}_item_variable", module.table_name()))
                        .table(table)
                        .col(Projection::Item)
                        .col(Projection::Variable)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for module in Module::ALL.into_iter().rev() {
            manager
                .drop_table(
                    Table::drop()
                        .table(Alias::new(module.table_name()))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

fn codes(pairs: &[(&str, &str)]) -> Vec<String> {
    pairs.iter().map(|(code, _)| code.to_string()).collect()
}

#[derive(DeriveIden)]
enum Projection {
    Id,
    Uuid,
    RegionId,
    Year,
    Value,
    Unit,
    Item,
    Variable,
}

#[derive(DeriveIden)]
enum Regions {
    Table,
    Id,
}
