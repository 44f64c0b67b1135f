// JSON-RPC envelope codec
//
// ubus wraps every invocation in a JSON-RPC 2.0 request whose `params` is a
// fixed four-element positional list, and answers with a `result` array of
// `[status, payload]` instead of a plain value:
//
//   -> {"jsonrpc":"2.0","id":1,"method":"call","params":[session, object, method, {args}]}
//   <- {"jsonrpc":"2.0","id":1,"result":[0, {...}]}
//
// Protocol-level failures (bad session, unknown object) come back with an
// `error` member and no `result`. A `list` over HTTP may answer with the
// signature map itself as `result`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::status::STATUS_OK;

/// JSON-RPC protocol version sent on every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Argument map passed as the fourth positional parameter.
///
/// Keys absent from the map are omitted on the wire, never sent as `null`.
pub type Args = Map<String, Value>;

/// Envelope `method` field: invoke an object method, or list object signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcMethod {
    Call,
    List,
}

impl RpcMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::List => "list",
        }
    }
}

// ── Request ──────────────────────────────────────────────────────────

/// Outgoing request envelope. `params` serializes as a JSON array in the
/// wire order `[session, object, method, args]`.
#[derive(Debug, Serialize)]
pub struct Request<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: RpcMethod,
    pub params: (&'a str, &'a str, &'a str, &'a Args),
}

/// Serialize a request envelope to bytes.
pub fn encode(
    method: RpcMethod,
    object: &str,
    object_method: &str,
    args: &Args,
    id: u64,
    session: &str,
) -> Result<Vec<u8>, Error> {
    let request = Request {
        jsonrpc: JSONRPC_VERSION,
        id,
        method,
        params: (session, object, object_method, args),
    };
    serde_json::to_vec(&request).map_err(|e| Error::Decode {
        message: format!("failed to encode request: {e}"),
        body: String::new(),
    })
}

/// Convert any serializable argument struct into an [`Args`] map.
///
/// Fails if the value does not serialize to a JSON object, since the remote
/// side always expects an object in the fourth position.
pub fn to_args<T: Serialize>(value: &T) -> Result<Args, Error> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::Decode {
            message: format!("call arguments must be a JSON object, got {other}"),
            body: String::new(),
        }),
        Err(e) => Err(Error::Decode {
            message: format!("failed to encode call arguments: {e}"),
            body: String::new(),
        }),
    }
}

// ── Response ─────────────────────────────────────────────────────────

/// The `error` member of a response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Wire shape of a response. `result` and `error` are not mutually
/// exclusive; `result` wins whenever it is present.
#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// What the response carried after decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A `result` array: raw status code plus payload (empty object when the
    /// router sent only the status).
    Status { code: i64, payload: Value },
    /// Only an `error` member, no `result`.
    Fault(RpcError),
}

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Echoed request id; `None` when the router could not parse the request.
    pub id: Option<u64>,
    pub reply: Reply,
}

/// Decode a response envelope from raw bytes.
pub fn decode(bytes: &[u8]) -> Result<Response, Error> {
    let malformed = |message: String| Error::Decode {
        message,
        body: String::from_utf8_lossy(bytes).into_owned(),
    };

    let raw: RawResponse =
        serde_json::from_slice(bytes).map_err(|e| malformed(format!("invalid envelope: {e}")))?;

    let reply = match (raw.result, raw.error) {
        // uhttpd answers `list` with the bare signature map
        (Some(Value::Object(payload)), _) => Reply::Status {
            code: STATUS_OK,
            payload: Value::Object(payload),
        },
        (Some(Value::Array(result)), _) => {
            let mut items = result.into_iter();
            let code = items
                .next()
                .ok_or_else(|| malformed("empty result array".into()))?;
            let code = code
                .as_i64()
                .ok_or_else(|| malformed(format!("status code {code} is not an integer")))?;
            let payload = items.next().unwrap_or_else(|| Value::Object(Map::new()));
            Reply::Status { code, payload }
        }
        (Some(other), _) => return Err(malformed(format!("result {other} is not an array"))),
        (None, Some(error)) => Reply::Fault(error),
        (None, None) => return Err(malformed("response has neither result nor error".into())),
    };

    Ok(Response { id: raw.id, reply })
}
