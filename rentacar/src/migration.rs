//! Schema migrations, run at startup and by the test suite.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateRentalTables)]
    }
}

#[derive(DeriveIden)]
enum Brand {
    Table,
    Id,
    BrandId,
    BrandName,
}

#[derive(DeriveIden)]
enum Car {
    Table,
    Id,
    BrandId,
    ColorId,
    ModelYear,
    DailyPrice,
    Description,
}

#[derive(DeriveIden)]
enum Color {
    Table,
    Id,
    ColorId,
    ColorName,
}

#[derive(DeriveIden)]
enum CarImage {
    Table,
    Id,
    CarId,
    ImagePath,
    Date,
}

#[derive(DeriveIden)]
enum Rental {
    Table,
    Id,
    RentDate,
    ReturnDate,
    CustomerId,
    CarId,
}

#[derive(DeriveIden)]
enum Customer {
    Table,
    Id,
    UserId,
    CompanyName,
}

fn id_column<T: IntoIden>(name: T) -> ColumnDef {
    ColumnDef::new(name)
        .big_integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

pub struct CreateRentalTables;

impl MigrationName for CreateRentalTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_rental_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateRentalTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brand::Table)
                    .if_not_exists()
                    .col(id_column(Brand::Id))
                    .col(ColumnDef::new(Brand::BrandId).big_integer().null())
                    .col(ColumnDef::new(Brand::BrandName).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(id_column(Car::Id))
                    .col(ColumnDef::new(Car::BrandId).big_integer().null())
                    .col(ColumnDef::new(Car::ColorId).big_integer().null())
                    .col(ColumnDef::new(Car::ModelYear).string().null())
                    .col(ColumnDef::new(Car::DailyPrice).double().null())
                    .col(ColumnDef::new(Car::Description).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Color::Table)
                    .if_not_exists()
                    .col(id_column(Color::Id))
                    .col(ColumnDef::new(Color::ColorId).big_integer().null())
                    .col(ColumnDef::new(Color::ColorName).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CarImage::Table)
                    .if_not_exists()
                    .col(id_column(CarImage::Id))
                    .col(ColumnDef::new(CarImage::CarId).big_integer().null())
                    .col(ColumnDef::new(CarImage::ImagePath).string().null())
                    .col(
                        ColumnDef::new(CarImage::Date)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rental::Table)
                    .if_not_exists()
                    .col(id_column(Rental::Id))
                    .col(
                        ColumnDef::new(Rental::RentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Rental::ReturnDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Rental::CustomerId).big_integer().null())
                    .col(ColumnDef::new(Rental::CarId).big_integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(id_column(Customer::Id))
                    .col(ColumnDef::new(Customer::UserId).big_integer().null())
                    .col(ColumnDef::new(Customer::CompanyName).string().null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Customer::Table.into_iden(),
            Rental::Table.into_iden(),
            CarImage::Table.into_iden(),
            Color::Table.into_iden(),
            Car::Table.into_iden(),
            Brand::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
