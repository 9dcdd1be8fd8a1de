use crate::cli::globals::ServerArgs;

pub mod server;

#[derive(Debug)]
pub enum Action {
    Server { port: u16, args: Box<ServerArgs> },
}
