use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_categories_table::Migration),
            Box::new(m20240101_000002_create_locations_table::Migration),
            Box::new(m20240101_000003_create_items_table::Migration),
            Box::new(m20240101_000004_create_calendar_events_table::Migration),
            Box::new(m20240101_000005_create_consumption_logs_table::Migration),
            Box::new(m20240101_000006_create_family_members_table::Migration),
            Box::new(m20240101_000007_create_user_settings_table::Migration),
        ]
    }
}

mod m20240101_000001_create_categories_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_categories_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Categories::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Categories::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Categories::UserId).uuid().not_null())
                        .col(ColumnDef::new(Categories::Name).string().not_null())
                        .col(ColumnDef::new(Categories::Color).string().not_null())
                        .col(ColumnDef::new(Categories::Icon).string().not_null())
                        .col(
                            ColumnDef::new(Categories::TargetQuantity)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(Categories::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Categories::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_categories_user_id")
                        .table(Categories::Table)
                        .col(Categories::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Categories::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Categories {
        Table,
        Id,
        UserId,
        Name,
        Color,
        Icon,
        TargetQuantity,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_locations_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_locations_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Locations::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Locations::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Locations::UserId).uuid().not_null())
                        .col(ColumnDef::new(Locations::Name).string().not_null())
                        .col(ColumnDef::new(Locations::Description).string().null())
                        .col(
                            ColumnDef::new(Locations::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Locations::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locations_user_id")
                        .table(Locations::Table)
                        .col(Locations::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Locations::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Locations {
        Table,
        Id,
        UserId,
        Name,
        Description,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_items_table {
    use super::m20240101_000001_create_categories_table::Categories;
    use super::m20240101_000002_create_locations_table::Locations;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Items::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Items::UserId).uuid().not_null())
                        .col(ColumnDef::new(Items::CategoryId).uuid().not_null())
                        .col(ColumnDef::new(Items::LocationId).uuid().not_null())
                        .col(ColumnDef::new(Items::Name).string().not_null())
                        .col(
                            ColumnDef::new(Items::Quantity)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(ColumnDef::new(Items::Unit).string().not_null())
                        .col(ColumnDef::new(Items::ExpirationDate).date().null())
                        .col(ColumnDef::new(Items::MaintenanceInterval).integer().null())
                        .col(ColumnDef::new(Items::LastMaintenanceDate).date().null())
                        .col(ColumnDef::new(Items::RotationSchedule).integer().null())
                        .col(ColumnDef::new(Items::LastRotationDate).date().null())
                        .col(
                            ColumnDef::new(Items::MinQuantity)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(Items::TargetQuantity)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(ColumnDef::new(Items::CaloriesPerUnit).double().null())
                        .col(ColumnDef::new(Items::Notes).string().null())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Items::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_category_id")
                                .from(Items::Table, Items::CategoryId)
                                .to(Categories::Table, Categories::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_items_location_id")
                                .from(Items::Table, Items::LocationId)
                                .to(Locations::Table, Locations::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_user_id")
                        .table(Items::Table)
                        .col(Items::UserId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_items_expiration_date")
                        .table(Items::Table)
                        .col(Items::ExpirationDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Items {
        Table,
        Id,
        UserId,
        CategoryId,
        LocationId,
        Name,
        Quantity,
        Unit,
        ExpirationDate,
        MaintenanceInterval,
        LastMaintenanceDate,
        RotationSchedule,
        LastRotationDate,
        MinQuantity,
        TargetQuantity,
        CaloriesPerUnit,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_calendar_events_table {
    use super::m20240101_000003_create_items_table::Items;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_calendar_events_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CalendarEvents::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CalendarEvents::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CalendarEvents::UserId).uuid().not_null())
                        .col(ColumnDef::new(CalendarEvents::ItemId).uuid().null())
                        .col(ColumnDef::new(CalendarEvents::Type).string().not_null())
                        .col(ColumnDef::new(CalendarEvents::Title).string().not_null())
                        .col(ColumnDef::new(CalendarEvents::Date).date().not_null())
                        .col(
                            ColumnDef::new(CalendarEvents::Completed)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CalendarEvents::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(CalendarEvents::Notes).string().null())
                        .col(
                            ColumnDef::new(CalendarEvents::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalendarEvents::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_calendar_events_item_id")
                                .from(CalendarEvents::Table, CalendarEvents::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_calendar_events_item_id")
                        .table(CalendarEvents::Table)
                        .col(CalendarEvents::ItemId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_calendar_events_user_date")
                        .table(CalendarEvents::Table)
                        .col(CalendarEvents::UserId)
                        .col(CalendarEvents::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CalendarEvents::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CalendarEvents {
        Table,
        Id,
        UserId,
        ItemId,
        Type,
        Title,
        Date,
        Completed,
        CompletedAt,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_consumption_logs_table {
    use super::m20240101_000003_create_items_table::Items;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_consumption_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ConsumptionLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ConsumptionLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ConsumptionLogs::UserId).uuid().not_null())
                        .col(ColumnDef::new(ConsumptionLogs::ItemId).uuid().not_null())
                        .col(ColumnDef::new(ConsumptionLogs::Quantity).double().not_null())
                        .col(ColumnDef::new(ConsumptionLogs::Type).string().not_null())
                        .col(ColumnDef::new(ConsumptionLogs::Note).string().null())
                        .col(
                            ColumnDef::new(ConsumptionLogs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_consumption_logs_item_id")
                                .from(ConsumptionLogs::Table, ConsumptionLogs::ItemId)
                                .to(Items::Table, Items::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_consumption_logs_item_id")
                        .table(ConsumptionLogs::Table)
                        .col(ConsumptionLogs::ItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ConsumptionLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ConsumptionLogs {
        Table,
        Id,
        UserId,
        ItemId,
        Quantity,
        Type,
        Note,
        CreatedAt,
    }
}

mod m20240101_000006_create_family_members_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_family_members_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FamilyMembers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FamilyMembers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FamilyMembers::UserId).uuid().not_null())
                        .col(ColumnDef::new(FamilyMembers::Name).string().not_null())
                        .col(ColumnDef::new(FamilyMembers::Age).integer().not_null())
                        .col(ColumnDef::new(FamilyMembers::WeightKg).double().not_null())
                        .col(ColumnDef::new(FamilyMembers::HeightCm).double().not_null())
                        .col(ColumnDef::new(FamilyMembers::Sex).string().not_null())
                        .col(
                            ColumnDef::new(FamilyMembers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_family_members_user_id")
                        .table(FamilyMembers::Table)
                        .col(FamilyMembers::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FamilyMembers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum FamilyMembers {
        Table,
        Id,
        UserId,
        Name,
        Age,
        WeightKg,
        HeightCm,
        Sex,
        CreatedAt,
    }
}

mod m20240101_000007_create_user_settings_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_user_settings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserSettings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(UserSettings::UserId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(UserSettings::ActivityLevel)
                                .string()
                                .not_null()
                                .default("sedentary"),
                        )
                        .col(
                            ColumnDef::new(UserSettings::WaterGoalGallons)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(UserSettings::FoodGoalDays)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(UserSettings::AmmoGoal)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(UserSettings::FuelGoal)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(UserSettings::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserSettings::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum UserSettings {
        Table,
        UserId,
        ActivityLevel,
        WaterGoalGallons,
        FoodGoalDays,
        AmmoGoal,
        FuelGoal,
        UpdatedAt,
    }
}
