use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;

mod access;
mod items;
mod purchases;
mod search;
mod trades;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// `write` transactions are additionally serialized through the engine's
/// write gate, so two writers in this process never race for the SQLite
/// write lock after having read.
macro_rules! with_tx {
    (write $self:expr, |$tx:ident| $body:expr) => {{
        let _gate = $self.write_gate.lock().await;
        with_tx!($self, |$tx| $body)
    }};
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of the marketplace: every operation runs in its own store
/// transaction against the injected database handle.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    write_gate: Mutex<()>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            write_gate: Mutex::new(()),
        })
    }
}
