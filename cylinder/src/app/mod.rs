mod commands;
mod event_loop;
mod init;
mod listener;
mod state;

pub use state::App;
