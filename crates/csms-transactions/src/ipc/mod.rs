//! IPC module for the request/reply exchange with the authentication service.
//!
//! Requests and replies travel over the shared event bus; the handler turns
//! that asynchronous exchange into a blocking call.

pub mod bus_adapter;
pub mod handler;

pub use bus_adapter::{EventBusReceiver, EventBusSender};
pub use handler::{AuthorizationHandler, IpcError, RequestSender, ResponseListener, ResponseReceiver};
