//! Political simulation core: a nation's economy, parliament, society and
//! narrative events advanced day by day through a single reducer.

pub mod simulation;
