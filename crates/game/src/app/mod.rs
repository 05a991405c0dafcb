mod bootstrap;
mod loop_runner;
mod player;
mod script;
mod spawner;

pub(crate) use bootstrap::build_app;
pub(crate) use loop_runner::run;
