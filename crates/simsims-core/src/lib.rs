//! SimSims Core -- the place graph and production engine of a small
//! worker economy.
//!
//! Places (buildings) hold typed resources (workers, food, products) and are
//! joined by directed connections. Nodes run timed production cycles on a
//! tokio runtime, pulling input from upstream containers and leaving output
//! for downstream places to collect.
//!
//! # Tick
//!
//! Each call to [`economy::Economy::tick`] visits every place once, in the
//! order they were built:
//!
//! 1. **Containers** (Magazine, Barn, Road) pull waiting output from their
//!    ingoing nodes.
//! 2. **Nodes** (Factory, Field, Flat, Diner) reap a finished cycle, push
//!    waiting output to outgoing nodes, or fetch input and start a new
//!    cycle.
//!
//! Cycles run concurrently with the tick and with each other. Every place
//! guards its inventory with its own lock and no code holds two place locks
//! at once, so a resource moving between places is owned by exactly one of
//! them at any time.
//!
//! # Key Types
//!
//! - [`economy::Economy`] -- Owns the places, the graph, running cycles and
//!   the player's selection.
//! - [`place::Place`] / [`place::PlaceKind`] -- A building and its static
//!   uses/produces table.
//! - [`graph::PlaceGraph`] -- Bidirectionally tracked directed connections.
//! - [`resource::Resource`] -- Worker, Food or Product.
//! - [`production`] -- Per-kind fetch and transform rules and the cycle task.
//! - [`serialize`] -- JSON and bitcode saves with a versioned header.

pub mod config;
pub mod container;
pub mod economy;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod place;
pub mod production;
pub mod query;
pub mod resource;
pub mod rng;
pub mod selection;
pub mod serialize;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
