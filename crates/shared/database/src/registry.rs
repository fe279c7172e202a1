//! Entity registry and schema auto-synchronization.
//!
//! Feature modules register their entities (and Postgres enum types) here
//! during composition. When synchronization is enabled the registry creates
//! whatever is missing from the connected database. Existing objects are
//! never altered or dropped.

use sea_orm::sea_query::{extension::postgres::TypeCreateStatement, TableCreateStatement};
use sea_orm::{
    ActiveEnum, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    Schema, Statement, Value,
};
use sea_orm_migration::SchemaManager;

struct RegisteredTable {
    name: String,
    create: fn(&Schema) -> TableCreateStatement,
}

struct RegisteredEnum {
    name: String,
    create: fn(&Schema) -> TypeCreateStatement,
}

fn create_table<E: EntityTrait>(schema: &Schema) -> TableCreateStatement {
    schema.create_table_from_entity(E::default())
}

fn create_enum<A: ActiveEnum>(schema: &Schema) -> TypeCreateStatement {
    schema.create_enum_from_active_enum::<A>()
}

/// Outcome of a synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Enum types and tables created by this run, in creation order
    pub created: Vec<String>,
    /// Objects that already existed and were left untouched
    pub existing: Vec<String>,
}

/// Explicit list of the schema objects owned by the application.
#[derive(Default)]
pub struct EntityRegistry {
    enums: Vec<RegisteredEnum>,
    tables: Vec<RegisteredTable>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity's table. Registering the same table twice is a no-op.
    pub fn register_entity<E: EntityTrait>(&mut self, entity: E) -> &mut Self {
        let name = entity.table_name().to_string();
        if !self.tables.iter().any(|t| t.name == name) {
            self.tables.push(RegisteredTable {
                name,
                create: create_table::<E>,
            });
        }
        self
    }

    /// Register a Postgres enum type backing an `ActiveEnum` column.
    /// Must be registered before the tables that use it.
    pub fn register_enum<A: ActiveEnum>(&mut self) -> &mut Self {
        let name = A::name().to_string();
        if !self.enums.iter().any(|e| e.name == name) {
            self.enums.push(RegisteredEnum {
                name,
                create: create_enum::<A>,
            });
        }
        self
    }

    /// Registered table names, in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }

    /// Registered enum type names, in registration order.
    pub fn enums(&self) -> impl Iterator<Item = &str> {
        self.enums.iter().map(|e| e.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.enums.is_empty()
    }

    /// The DDL synchronization would run against an empty database.
    pub fn create_statements(&self, backend: DbBackend) -> Vec<String> {
        let schema = Schema::new(backend);
        let mut statements = Vec::new();

        if backend == DbBackend::Postgres {
            statements.extend(
                self.enums
                    .iter()
                    .map(|e| backend.build(&(e.create)(&schema)).sql),
            );
        }
        statements.extend(
            self.tables
                .iter()
                .map(|t| backend.build(&(t.create)(&schema)).sql),
        );

        statements
    }

    /// Create every registered enum type and table missing from `db`.
    pub async fn synchronize(&self, db: &DatabaseConnection) -> Result<SyncReport, DbErr> {
        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let manager = SchemaManager::new(db);
        let mut report = SyncReport::default();

        if backend == DbBackend::Postgres {
            for entry in &self.enums {
                if enum_exists(db, &entry.name).await? {
                    report.existing.push(entry.name.clone());
                    continue;
                }
                manager.create_type((entry.create)(&schema)).await?;
                tracing::info!(enum_type = %entry.name, "Created enum type");
                report.created.push(entry.name.clone());
            }
        }

        for entry in &self.tables {
            if manager.has_table(&entry.name).await? {
                report.existing.push(entry.name.clone());
                continue;
            }
            let mut statement = (entry.create)(&schema);
            manager
                .create_table(statement.if_not_exists().to_owned())
                .await?;
            tracing::info!(table = %entry.name, "Created table");
            report.created.push(entry.name.clone());
        }

        Ok(report)
    }
}

async fn enum_exists(db: &DatabaseConnection, name: &str) -> Result<bool, DbErr> {
    let statement = Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT 1 FROM pg_type WHERE typname = $1",
        [Value::from(name.to_owned())],
    );
    Ok(db.query_one(statement).await?.is_some())
}
