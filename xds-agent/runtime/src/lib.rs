#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use xds_agent_api as api;
pub use xds_agent_core as core;
pub use xds_agent_lds as lds;
pub use xds_agent_sds as sds;

mod args;
mod snapshot;

pub use self::args::Args;
