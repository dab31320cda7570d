mod bootstrap;
mod collaborators;
mod loop_runner;
mod room;
mod scene;
mod script;

pub(crate) use bootstrap::{build_app, init_tracing};
pub(crate) use loop_runner::run;
