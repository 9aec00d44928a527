//! Datagram command dispatch: envelope decode, routing, receive loop

pub mod command;
pub mod handler;
pub mod server;

pub use command::{Command, CommandError};
pub use handler::MessageHandler;
pub use server::DispatchServer;
