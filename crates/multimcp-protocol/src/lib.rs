#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

pub mod envelope;
pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod tool;
pub mod transport;
pub mod wire;

pub use envelope::{ToolContent, ToolResult};
pub use error::{ProtocolError, ToolError, TransportError};
pub use router::{RequestHandler, Router};
pub use server::ToolServer;
pub use tool::{Tool, ToolTable, parse_arguments};
pub use transport::{LineReader, LineWriter};
pub use wire::{ErrorObject, RequestKind, RequestMessage, Response, ResponseBody, ToolList};
