// Interface adapters: wire protocol, outbound clients and log sinks.

pub mod clients;
pub mod log;
pub mod protocol;
