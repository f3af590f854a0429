//! Split-ticket fare engine for bahn.de.
//!
//! A web application that answers: "would this journey be cheaper as
//! several tickets than as one?" It prices every pair of stops on a shared
//! journey and finds the cheapest chain of tickets from origin to
//! destination.

pub mod analysis;
pub mod bahn;
pub mod booking;
pub mod config;
pub mod domain;
pub mod graph;
pub mod link;
pub mod optimizer;
pub mod quote;
pub mod web;
