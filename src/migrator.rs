use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_clients_table::Migration),
            Box::new(m20240301_000002_create_client_models_table::Migration),
            Box::new(m20240301_000003_create_inbound_tables::Migration),
            Box::new(m20240301_000004_create_outbound_tables::Migration),
            Box::new(m20240301_000005_create_invoice_tables::Migration),
            Box::new(m20240301_000006_create_production_sheet_tables::Migration),
            Box::new(m20240301_000007_create_staff_tables::Migration),
            Box::new(m20240301_000008_create_calendar_events_table::Migration),
        ]
    }
}

mod m20240301_000001_create_clients_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Clients::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Clients::Name).string().not_null())
                        .col(ColumnDef::new(Clients::Email).string().null())
                        .col(ColumnDef::new(Clients::Phone).string().null())
                        .col(ColumnDef::new(Clients::Address).string().null())
                        .col(ColumnDef::new(Clients::ContactPerson).string().null())
                        .col(ColumnDef::new(Clients::SubmissionStart).date().null())
                        .col(ColumnDef::new(Clients::SubmissionEnd).date().null())
                        .col(
                            ColumnDef::new(Clients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Clients::UpdatedAt)
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
                        .name("idx_clients_name")
                        .table(Clients::Table)
                        .col(Clients::Name)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Clients {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Address,
        ContactPerson,
        SubmissionStart,
        SubmissionEnd,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_client_models_table {
    use super::m20240301_000001_create_clients_table::Clients;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_client_models_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ClientModels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ClientModels::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ClientModels::ClientId).integer().not_null())
                        .col(ColumnDef::new(ClientModels::Name).string().not_null())
                        .col(ColumnDef::new(ClientModels::Description).text().null())
                        .col(ColumnDef::new(ClientModels::Commandes).text().null())
                        .col(ColumnDef::new(ClientModels::Variants).json().not_null())
                        .col(
                            ColumnDef::new(ClientModels::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ClientModels::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_client_models_client_id")
                                .from(ClientModels::Table, ClientModels::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_client_models_client_id")
                        .table(ClientModels::Table)
                        .col(ClientModels::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ClientModels::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ClientModels {
        Table,
        Id,
        ClientId,
        Name,
        Description,
        Commandes,
        Variants,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000003_create_inbound_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_inbound_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Import declarations and incoming deliveries, told apart by `kind`
            manager
                .create_table(
                    Table::create()
                        .table(InboundDocuments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InboundDocuments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InboundDocuments::Kind).string_len(32).not_null())
                        .col(ColumnDef::new(InboundDocuments::ClientId).integer().null())
                        .col(ColumnDef::new(InboundDocuments::Client).string().not_null())
                        .col(ColumnDef::new(InboundDocuments::Reference).string().not_null())
                        .col(ColumnDef::new(InboundDocuments::Date).date().not_null())
                        .col(ColumnDef::new(InboundDocuments::Notes).text().null())
                        .col(
                            ColumnDef::new(InboundDocuments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InboundDocuments::UpdatedAt)
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
                        .name("idx_inbound_documents_kind_date")
                        .table(InboundDocuments::Table)
                        .col(InboundDocuments::Kind)
                        .col(InboundDocuments::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InboundLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InboundLines::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InboundLines::DocumentId).integer().not_null())
                        .col(ColumnDef::new(InboundLines::ClientModelId).integer().null())
                        .col(ColumnDef::new(InboundLines::Model).string().not_null())
                        .col(ColumnDef::new(InboundLines::Commande).string().not_null())
                        .col(
                            ColumnDef::new(InboundLines::QuantityRecu)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InboundLines::QuantityTrouve)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_inbound_lines_document_id")
                                .from(InboundLines::Table, InboundLines::DocumentId)
                                .to(InboundDocuments::Table, InboundDocuments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Accessories::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Accessories::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Accessories::DocumentId).integer().not_null())
                        .col(ColumnDef::new(Accessories::Model).string().not_null())
                        .col(ColumnDef::new(Accessories::Name).string().not_null())
                        .col(
                            ColumnDef::new(Accessories::QuantityRecu)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Accessories::QuantityTrouve)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Accessories::QuantitySortie)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_accessories_document_id")
                                .from(Accessories::Table, Accessories::DocumentId)
                                .to(InboundDocuments::Table, InboundDocuments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inbound_lines_document_id")
                        .table(InboundLines::Table)
                        .col(InboundLines::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Accessories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InboundLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InboundDocuments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum InboundDocuments {
        Table,
        Id,
        Kind,
        ClientId,
        Client,
        Reference,
        Date,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InboundLines {
        Table,
        Id,
        DocumentId,
        ClientModelId,
        Model,
        Commande,
        QuantityRecu,
        QuantityTrouve,
    }

    #[derive(DeriveIden)]
    enum Accessories {
        Table,
        Id,
        DocumentId,
        Model,
        Name,
        QuantityRecu,
        QuantityTrouve,
        QuantitySortie,
    }
}

mod m20240301_000004_create_outbound_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_outbound_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OutboundDocuments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboundDocuments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OutboundDocuments::Kind).string_len(32).not_null())
                        .col(ColumnDef::new(OutboundDocuments::ClientId).integer().null())
                        .col(ColumnDef::new(OutboundDocuments::Client).string().not_null())
                        .col(ColumnDef::new(OutboundDocuments::Reference).string().not_null())
                        .col(ColumnDef::new(OutboundDocuments::Date).date().not_null())
                        .col(
                            ColumnDef::new(OutboundDocuments::Status)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(OutboundDocuments::DueDate).date().null())
                        .col(
                            ColumnDef::new(OutboundDocuments::VatActive)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(OutboundDocuments::VatRate)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(OutboundDocuments::PaymentMode).string().null())
                        .col(ColumnDef::new(OutboundDocuments::Notes).text().null())
                        .col(
                            ColumnDef::new(OutboundDocuments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OutboundDocuments::UpdatedAt)
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
                        .name("idx_outbound_documents_kind_date")
                        .table(OutboundDocuments::Table)
                        .col(OutboundDocuments::Kind)
                        .col(OutboundDocuments::Date)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OutboundLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OutboundLines::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(OutboundLines::DocumentId).integer().not_null())
                        .col(ColumnDef::new(OutboundLines::ClientModelId).integer().null())
                        .col(ColumnDef::new(OutboundLines::Model).string().not_null())
                        .col(ColumnDef::new(OutboundLines::Commande).string().not_null())
                        .col(ColumnDef::new(OutboundLines::Description).string().null())
                        .col(
                            ColumnDef::new(OutboundLines::QuantityLivree)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboundLines::UnitPrice)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(OutboundLines::IsExcluded)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_outbound_lines_document_id")
                                .from(OutboundLines::Table, OutboundLines::DocumentId)
                                .to(OutboundDocuments::Table, OutboundDocuments::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_outbound_lines_document_id")
                        .table(OutboundLines::Table)
                        .col(OutboundLines::DocumentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OutboundLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OutboundDocuments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OutboundDocuments {
        Table,
        Id,
        Kind,
        ClientId,
        Client,
        Reference,
        Date,
        Status,
        DueDate,
        VatActive,
        VatRate,
        PaymentMode,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OutboundLines {
        Table,
        Id,
        DocumentId,
        ClientModelId,
        Model,
        Commande,
        Description,
        QuantityLivree,
        UnitPrice,
        IsExcluded,
    }
}

mod m20240301_000005_create_invoice_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_invoice_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Invoices::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Invoices::Number)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Invoices::IssuerName).string().not_null())
                        .col(ColumnDef::new(Invoices::ClientId).integer().null())
                        .col(ColumnDef::new(Invoices::ClientName).string().not_null())
                        .col(ColumnDef::new(Invoices::ClientAddress).string().null())
                        .col(ColumnDef::new(Invoices::InvoiceDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date().null())
                        .col(
                            ColumnDef::new(Invoices::VatActive)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Invoices::VatRate)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Invoices::PaymentMode).string().null())
                        .col(
                            ColumnDef::new(Invoices::Status)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(ColumnDef::new(Invoices::Notes).text().null())
                        .col(
                            ColumnDef::new(Invoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::UpdatedAt)
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
                        .name("idx_invoices_status")
                        .table(Invoices::Table)
                        .col(Invoices::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InvoiceLines::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(InvoiceLines::InvoiceId).integer().not_null())
                        .col(ColumnDef::new(InvoiceLines::Commande).string().not_null())
                        .col(ColumnDef::new(InvoiceLines::Model).string().not_null())
                        .col(ColumnDef::new(InvoiceLines::Description).string().null())
                        .col(
                            ColumnDef::new(InvoiceLines::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InvoiceLines::UnitPrice)
                                .decimal_len(19, 4)
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_lines_invoice_id")
                                .from(InvoiceLines::Table, InvoiceLines::InvoiceId)
                                .to(Invoices::Table, Invoices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_lines_invoice_id")
                        .table(InvoiceLines::Table)
                        .col(InvoiceLines::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InvoiceLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        Number,
        IssuerName,
        ClientId,
        ClientName,
        ClientAddress,
        InvoiceDate,
        DueDate,
        VatActive,
        VatRate,
        PaymentMode,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InvoiceLines {
        Table,
        Id,
        InvoiceId,
        Commande,
        Model,
        Description,
        Quantity,
        UnitPrice,
    }
}

mod m20240301_000006_create_production_sheet_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_production_sheet_tables"
        }
    }

    /// Cutting and sewing sheets have the same shape, only the grid cell differs.
    fn sheet_table<T: Iden + Copy + 'static>(
        table: T,
        cols: [T; 9],
    ) -> TableCreateStatement {
        let [id, client, model, commande, client_model_id, grid, notes, created_at, updated_at] =
            cols;
        Table::create()
            .table(table)
            .if_not_exists()
            .col(
                ColumnDef::new(id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(client).string().not_null())
            .col(ColumnDef::new(model).string().not_null())
            .col(ColumnDef::new(commande).string().not_null())
            .col(ColumnDef::new(client_model_id).integer().null())
            .col(ColumnDef::new(grid).json().not_null())
            .col(ColumnDef::new(notes).text().null())
            .col(
                ColumnDef::new(created_at)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .col(
                ColumnDef::new(updated_at)
                    .timestamp_with_time_zone()
                    .not_null(),
            )
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(sheet_table(
                    FicheCoupes::Table,
                    [
                        FicheCoupes::Id,
                        FicheCoupes::Client,
                        FicheCoupes::Model,
                        FicheCoupes::Commande,
                        FicheCoupes::ClientModelId,
                        FicheCoupes::Grid,
                        FicheCoupes::Notes,
                        FicheCoupes::CreatedAt,
                        FicheCoupes::UpdatedAt,
                    ],
                ))
                .await?;

            manager
                .create_table(sheet_table(
                    FicheProductions::Table,
                    [
                        FicheProductions::Id,
                        FicheProductions::Client,
                        FicheProductions::Model,
                        FicheProductions::Commande,
                        FicheProductions::ClientModelId,
                        FicheProductions::Grid,
                        FicheProductions::Notes,
                        FicheProductions::CreatedAt,
                        FicheProductions::UpdatedAt,
                    ],
                ))
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SuiviProductions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SuiviProductions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SuiviProductions::Client).string().not_null())
                        .col(ColumnDef::new(SuiviProductions::Model).string().not_null())
                        .col(ColumnDef::new(SuiviProductions::Lines).json().not_null())
                        .col(ColumnDef::new(SuiviProductions::Notes).text().null())
                        .col(
                            ColumnDef::new(SuiviProductions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SuiviProductions::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SuiviProductions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(FicheProductions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(FicheCoupes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum FicheCoupes {
        Table,
        Id,
        Client,
        Model,
        Commande,
        ClientModelId,
        Grid,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum FicheProductions {
        Table,
        Id,
        Client,
        Model,
        Commande,
        ClientModelId,
        Grid,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum SuiviProductions {
        Table,
        Id,
        Client,
        Model,
        Lines,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000007_create_staff_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000007_create_staff_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employees::Name).string().not_null())
                        .col(ColumnDef::new(Employees::Position).string().null())
                        .col(ColumnDef::new(Employees::Phone).string().null())
                        .col(
                            ColumnDef::new(Employees::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(Employees::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Employees::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductionTimes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionTimes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ProductionTimes::EmployeeId).integer().not_null())
                        .col(
                            ColumnDef::new(ProductionTimes::FicheProductionId)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(ProductionTimes::Date).date().not_null())
                        .col(
                            ColumnDef::new(ProductionTimes::Minutes)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionTimes::Pieces)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionTimes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_production_times_employee_id")
                                .from(ProductionTimes::Table, ProductionTimes::EmployeeId)
                                .to(Employees::Table, Employees::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_times_employee_date")
                        .table(ProductionTimes::Table)
                        .col(ProductionTimes::EmployeeId)
                        .col(ProductionTimes::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionTimes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        Name,
        Position,
        Phone,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductionTimes {
        Table,
        Id,
        EmployeeId,
        FicheProductionId,
        Date,
        Minutes,
        Pieces,
        CreatedAt,
    }
}

mod m20240301_000008_create_calendar_events_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000008_create_calendar_events_table"
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
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(CalendarEvents::Title).string().not_null())
                        .col(ColumnDef::new(CalendarEvents::Description).text().null())
                        .col(
                            ColumnDef::new(CalendarEvents::StartAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(CalendarEvents::EndAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(CalendarEvents::ClientId).integer().null())
                        .col(
                            ColumnDef::new(CalendarEvents::CreatedAt)
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
                        .name("idx_calendar_events_start_at")
                        .table(CalendarEvents::Table)
                        .col(CalendarEvents::StartAt)
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
        Title,
        Description,
        StartAt,
        EndAt,
        ClientId,
        CreatedAt,
    }
}
