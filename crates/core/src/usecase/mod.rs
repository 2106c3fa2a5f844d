pub mod actions;
pub mod flow;
pub mod flows;
