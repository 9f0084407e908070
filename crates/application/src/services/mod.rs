//! Application services

mod work_loop;

pub use work_loop::{StopReason, WorkLoopConfig, WorkLoopReport, WorkLoopService, WorkUnit};
