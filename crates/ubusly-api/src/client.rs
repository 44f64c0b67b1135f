// ubus JSON-RPC client
//
// Owns the bound transport, the session token and the request id counter,
// and runs the call pipeline: encode, send, decode, match ids, classify.
// Session handling and the per-object modules (file, log, uci, iwinfo) are
// inherent methods in separate files; they all funnel through `call`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::envelope::{self, Args, Reply, RpcError, RpcMethod};
use crate::error::Error;
use crate::session::Session;
use crate::status::UbusStatus;
use crate::transport::{Endpoint, Transport, TransportConfig};

/// JSON-RPC error code rpcd uses for "Access denied".
const RPC_ACCESS_DENIED: i64 = -32002;

/// Client for one ubus endpoint and one logical session.
///
/// Every state-changing operation takes `&mut self`: the token and the
/// request id are read and advanced as one step per round trip, so a client
/// shared between tasks must sit behind a lock.
#[derive(Debug)]
pub struct Client {
    endpoint: Endpoint,
    transport: Transport,
    pub(crate) session: Session,
    request_id: u64,
}

impl Client {
    /// Create a client for an endpoint string.
    ///
    /// An empty string targets the default rpcd socket; `http(s)://` URLs
    /// are used verbatim.
    pub fn new(endpoint: &str, config: &TransportConfig) -> Result<Self, Error> {
        Self::from_endpoint(Endpoint::parse(endpoint)?, config)
    }

    /// Create a client for an already-resolved endpoint.
    pub fn from_endpoint(endpoint: Endpoint, config: &TransportConfig) -> Result<Self, Error> {
        let transport = Transport::bind(&endpoint, config)?;
        Ok(Self {
            endpoint,
            transport,
            session: Session::default(),
            request_id: 1,
        })
    }

    /// The endpoint this client was built for.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The transport bound at construction.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The id the next request will carry.
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Invoke `method` on `object`.
    ///
    /// On a non-zero ubus status the payload, if any, travels inside the
    /// returned error (see [`Error::payload`]).
    pub async fn call(&mut self, object: &str, method: &str, args: &Args) -> Result<Value, Error> {
        self.dispatch(RpcMethod::Call, object, method, args).await
    }

    /// Ask the bus for object signatures through the `list` envelope method.
    pub async fn list(&mut self, object: &str, method: &str, args: &Args) -> Result<Value, Error> {
        self.dispatch(RpcMethod::List, object, method, args).await
    }

    async fn dispatch(
        &mut self,
        rpc: RpcMethod,
        object: &str,
        method: &str,
        args: &Args,
    ) -> Result<Value, Error> {
        let id = self.request_id;
        let body = envelope::encode(rpc, object, method, args, id, self.session.token())?;

        debug!(rpc = rpc.as_str(), object, method, id, "ubus request");

        let raw = self.transport.send(body).await?;
        trace!(bytes = raw.len(), "ubus response");

        let response = envelope::decode(&raw)?;
        if response.id != Some(id) {
            return Err(Error::IdMismatch {
                sent: id,
                received: response.id,
            });
        }
        self.request_id += 1;

        match response.reply {
            Reply::Status { code, payload } => match UbusStatus::classify(code) {
                None => Ok(payload),
                Some(UbusStatus::PermissionDenied) => Err(Error::PermissionDenied {
                    object: object.to_owned(),
                    method: method.to_owned(),
                    payload,
                }),
                Some(status) => Err(Error::Status {
                    status,
                    object: object.to_owned(),
                    method: method.to_owned(),
                    payload,
                }),
            },
            Reply::Fault(fault) => Err(fault_error(fault, object, method)),
        }
    }

    // ── Typed helpers for object modules ─────────────────────────────

    /// Require a session, call, and decode the payload into `T`.
    pub(crate) async fn invoke<T: DeserializeOwned>(
        &mut self,
        object: &str,
        method: &str,
        args: &Args,
    ) -> Result<T, Error> {
        self.require_login()?;
        let payload = self.call(object, method, args).await?;
        decode_payload(object, method, &payload)
    }

    /// Require a session and call, discarding the payload.
    pub(crate) async fn invoke_unit(
        &mut self,
        object: &str,
        method: &str,
        args: &Args,
    ) -> Result<(), Error> {
        self.require_login()?;
        self.call(object, method, args).await?;
        Ok(())
    }
}

/// Map an `error`-only response. rpcd reports missing ACL grants either as
/// ubus status 6 or as JSON-RPC code -32002.
fn fault_error(fault: RpcError, object: &str, method: &str) -> Error {
    let code = fault.code;
    if code == UbusStatus::PermissionDenied.code() || code == RPC_ACCESS_DENIED {
        return Error::PermissionDenied {
            object: object.to_owned(),
            method: method.to_owned(),
            payload: Value::Null,
        };
    }
    Error::Rpc {
        code,
        message: fault.message,
    }
}

/// Decode a call payload into a module's result type.
pub(crate) fn decode_payload<T: DeserializeOwned>(
    object: &str,
    method: &str,
    payload: &Value,
) -> Result<T, Error> {
    T::deserialize(payload).map_err(|e| Error::Decode {
        message: format!("unexpected {object}.{method} payload: {e}"),
        body: payload.to_string(),
    })
}
