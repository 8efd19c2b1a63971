//! Interactive menus for the coinshell crypto terminal.
//!
//! - [`Menu`] - A command table plus the loop that reads and dispatches lines
//! - [`Context`] - Session state, providers and console handed to every handler
//! - [`Console`] - Where input comes from: [`InquireConsole`], [`LineConsole`], [`ScriptedConsole`]
//! - [`controllers`] - The `crypto` menu and its `disc`, `ov` and `dd` sub-menus

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/coinshell/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod args;
mod console;
mod context;
pub mod controllers;
mod dispatcher;
mod session;

#[cfg(test)]
mod testing;

pub use action::Action;
pub use console::{Console, InquireConsole, LineConsole, ScriptedConsole};
pub use context::{Context, MenuOptions, Services};
pub use dispatcher::{Command, Handler, Menu, StatusLine, UNKNOWN_COMMAND};
pub use session::Session;

/// Runs the `crypto` menu until the user quits or input ends.
///
/// # Errors
///
/// Returns an error if the console cannot be read.
pub async fn run(ctx: &mut Context) -> anyhow::Result<()> {
    controllers::crypto::menu().run(ctx).await?;
    Ok(())
}
