use std::time::Duration;

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::core::Value;
use crate::engine::config::{EngineConfig, StorageLocation};
use crate::engine::protocol::{Request, Response, ResponseBody};
use crate::result::{QueryResult, Row};

/// Worker thread body: opens the engine, reports readiness on the handshake
/// channel, then serves requests until the request channel closes.
///
/// A failing statement answers its own request and nothing else; the host
/// stays usable for whatever comes next.
pub(crate) fn run(
    config: EngineConfig,
    mut requests: mpsc::Receiver<Request>,
    responses: mpsc::UnboundedSender<Response>,
    ready: oneshot::Sender<std::result::Result<(), String>>,
) {
    let conn = match open_engine(&config) {
        Ok(conn) => {
            let _ = ready.send(Ok(()));
            conn
        }
        Err(err) => {
            let _ = ready.send(Err(err.to_string()));
            return;
        }
    };

    info!(storage = ?config.storage, "database engine opened");

    while let Some(request) = requests.blocking_recv() {
        debug!(id = %request.id, sql = %request.sql, "executing statement");
        let body = match run_statement(&conn, &request.sql, &request.params) {
            Ok(result) => ResponseBody::Rows(result),
            Err(err) => ResponseBody::Error(err.to_string()),
        };
        if responses
            .send(Response {
                id: request.id,
                body,
            })
            .is_err()
        {
            // Dispatcher is gone; nobody is waiting on anything anymore.
            break;
        }
    }

    debug!("database worker shutting down");
}

fn open_engine(config: &EngineConfig) -> rusqlite::Result<Connection> {
    match &config.storage {
        StorageLocation::InMemory => Connection::open_in_memory(),
        StorageLocation::File(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(err) = std::fs::create_dir_all(parent) {
                        warn!(path = %parent.display(), error = %err, "failed to create store directory");
                    }
                }
            }
            let conn = Connection::open(path)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(conn)
        }
    }
}

/// The single execute path: prepare, bind, step, materialize. Statements
/// that produce no rows (DDL, plain INSERT) come back with zero columns.
fn run_statement(conn: &Connection, sql: &str, params: &[Value]) -> rusqlite::Result<QueryResult> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let column_count = columns.len();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut collected: Vec<Row> = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(column_count);
        for index in 0..column_count {
            cells.push(cell_value(row.get_ref(index)?));
        }
        collected.push(cells);
    }

    Ok(QueryResult::new(columns, collected))
}

fn cell_value(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(text) => Value::Text(String::from_utf8_lossy(text).into_owned()),
        // The registry schema has no blob columns; console queries that
        // produce one get a lossy text rendering.
        ValueRef::Blob(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Float(f) => ToSqlOutput::Owned(SqlValue::Real(*f)),
            Value::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn test_statement_binds_and_materializes() {
        let conn = memory_conn();
        run_statement(&conn, "CREATE TABLE t (n INTEGER, s TEXT)", &[]).unwrap();
        run_statement(
            &conn,
            "INSERT INTO t VALUES (?1, ?2)",
            &[Value::Integer(1), Value::Null],
        )
        .unwrap();

        let result = run_statement(&conn, "SELECT n, s FROM t", &[]).unwrap();
        assert_eq!(result.columns, vec!["n", "s"]);
        assert_eq!(result.rows, vec![vec![Value::Integer(1), Value::Null]]);
    }

    #[test]
    fn test_statement_failure_is_an_error_value() {
        let conn = memory_conn();
        let err = run_statement(&conn, "SELECT * FORM t", &[]).unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_non_query_statement_has_no_columns() {
        let conn = memory_conn();
        let result = run_statement(&conn, "CREATE TABLE t (n INTEGER)", &[]).unwrap();
        assert!(result.columns.is_empty());
        assert!(result.rows.is_empty());
    }
}
