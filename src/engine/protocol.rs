use uuid::Uuid;

use crate::core::Value;
use crate::result::QueryResult;

/// One statement for the worker: a caller-generated correlation token,
/// statement text, and positional bind values (1-indexed placeholders).
#[derive(Debug)]
pub(crate) struct Request {
    pub id: Uuid,
    pub sql: String,
    pub params: Vec<Value>,
}

/// Exactly one response per request, bearing the same token. The worker
/// never reports progress and never sends unsolicited messages.
#[derive(Debug)]
pub(crate) struct Response {
    pub id: Uuid,
    pub body: ResponseBody,
}

#[derive(Debug)]
pub(crate) enum ResponseBody {
    Rows(QueryResult),
    Error(String),
}
