//! Thread-backed scheduler.
//!
//! This module contains the production scheduler:
//! - `builder`: configuration of the loop,
//! - `injector`: the FIFO job queue with worker parking,
//! - `worker`: the thread draining the injector,
//! - `core`: the owning [`EventLoop`] and its waiting API.
//!
//! A single worker drains the queue, so jobs run in submission order.

mod builder;
mod core;
mod injector;
mod worker;

pub use self::builder::EventLoopBuilder;
pub use self::core::EventLoop;
