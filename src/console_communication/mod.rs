//! Operator console link: a TCP endpoint speaking length-prefixed protobuf frames,
//! the message definitions, and the messenger dispatching console requests to the
//! ground station.

mod console_endpoint;
mod console_messenger;
mod ground_messages;

pub use console_messenger::ConsoleMessenger;
