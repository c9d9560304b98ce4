use std::thread;

use diesel::connection::{Connection, SimpleConnection};
use diesel::sqlite::SqliteConnection;
use log::info;
use tokio::sync::{mpsc, oneshot};

use crate::errors::{DatabaseError, Error, Result};

type WriteJob = Box<dyn FnOnce(&mut SqliteConnection) + Send + 'static>;

/// Handle to the single writer thread. All mutations go through one dedicated
/// connection, and each job runs inside its own transaction, so a
/// read-modify-write sequence submitted as one job (e.g. count rows, then
/// insert with the next sort order) is atomic with respect to every other
/// write in the process.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::UnboundedSender<WriteJob>,
}

impl WriteHandle {
    pub fn spawn(db_path: &str) -> Result<Self> {
        let mut conn =
            SqliteConnection::establish(db_path).map_err(DatabaseError::ConnectionFailed)?;
        conn.batch_execute(
            "
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 30000;
            PRAGMA synchronous = NORMAL;
        ",
        )
        .map_err(|e| Error::Database(DatabaseError::QueryFailed(e)))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<WriteJob>();
        thread::Builder::new()
            .name("budget-db-writer".to_string())
            .spawn(move || {
                info!("Database writer thread started");
                while let Some(job) = rx.blocking_recv() {
                    job(&mut conn);
                }
                info!("Database writer thread stopped");
            })
            .map_err(|e| Error::Database(DatabaseError::WriterUnavailable(e.to_string())))?;

        Ok(WriteHandle { tx })
    }

    /// Runs `f` on the writer connection, inside a transaction, and returns
    /// its result.
    pub async fn exec<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel::<Result<T>>();

        let job: WriteJob = Box::new(move |conn| {
            let result = conn.transaction(|tx_conn| f(tx_conn));
            let _ = reply_tx.send(result);
        });

        self.tx.send(job).map_err(|_| {
            Error::Database(DatabaseError::WriterUnavailable(
                "write channel closed".to_string(),
            ))
        })?;

        reply_rx.await.map_err(|_| {
            Error::Database(DatabaseError::WriterUnavailable(
                "writer dropped the reply channel".to_string(),
            ))
        })?
    }
}
