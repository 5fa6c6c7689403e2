//! Addressed text relay over TCP.
//!
//! Clients connect, send a display name as their first line, and from then on
//! send `destination:content` lines. The server forwards `sender: content` to
//! the named destination if it is connected and silently drops it otherwise.
//! Sending to the reserved destination `salir` closes the sender's connection.
//!
//! Delivery is fire-and-forget: nothing tells a sender whether a message
//! arrived, and messages for absent or backed-up recipients are lost.
//!
//! - [`cli`] parses the command line for server and client modes, and
//!   [`prompt`] asks for the same settings interactively.
//! - [`server`] accepts TCP connections and spawns one task per client.
//! - [`connection`] runs the per-client state machine: unregistered, active,
//!   closed.
//! - [`registry`] is the shared name table, [`router`] looks destinations up
//!   in it, and [`outbox`] queues payloads for each client's writer task.
//! - [`frame`] and [`message`] handle newline framing and `destination:content`
//!   parsing.
//! - [`client`] is the terminal side of the same protocol.

pub mod cli;
pub mod client;
pub mod connection;
pub mod frame;
pub mod message;
pub mod outbox;
pub mod prompt;
pub mod registry;
pub mod router;
pub mod server;
