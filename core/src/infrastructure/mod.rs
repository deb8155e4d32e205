//! Infrastructure backends: the process runner (spawning `aws`/`eb`) and the
//! sleeper the poller waits on. Both have a production implementation and a
//! recording test double.

pub mod runner;
pub mod sleeper;
