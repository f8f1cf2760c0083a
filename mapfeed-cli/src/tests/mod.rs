//! Shared test harness modules for the mapfeed CLI.

use super::*;

mod helpers;
mod steps;
