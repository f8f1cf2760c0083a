//! Behaviour-driven step definitions driving the extract CLI scenarios.

use super::helpers::{RollupDatabase, json_lines};
use super::*;
use crate::extract::{resolve_extract_config, run_extract_with};
use camino::Utf8PathBuf;
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;

/// Aggregates extract CLI scenario state so each step only needs a single
/// world argument.
#[derive(Debug)]
struct ExtractWorld {
    database: RollupDatabase,
    database_path: RefCell<Option<Utf8PathBuf>>,
    outcome: RefCell<Option<Result<Vec<u8>, CliError>>>,
}

impl ExtractWorld {
    fn new() -> Self {
        Self {
            database: RollupDatabase::new(),
            database_path: RefCell::new(None),
            outcome: RefCell::new(None),
        }
    }

    fn output(&self) -> Vec<u8> {
        self.outcome
            .borrow()
            .as_ref()
            .expect("command was run")
            .as_ref()
            .expect("expected success")
            .clone()
    }
}

#[fixture]
fn world() -> ExtractWorld {
    ExtractWorld::new()
}

#[given("a rollup database with {count} attributed nodes")]
fn attributed_nodes(#[from(world)] world: &ExtractWorld, count: i64) {
    for id in 1..=count {
        world.database.insert_node(id, id, 0, 0);
        world
            .database
            .insert_owner(id, id * 10, &format!("user{id}"), true);
    }
    *world.database_path.borrow_mut() = Some(world.database.path().to_path_buf());
}

#[given("a path to a missing rollup database")]
fn missing_database(#[from(world)] world: &ExtractWorld) {
    let missing = world
        .database
        .path()
        .parent()
        .expect("database lives in a directory")
        .join("missing.db");
    *world.database_path.borrow_mut() = Some(missing);
}

#[when("I run the extract command for {kind}")]
fn run_extract_command(#[from(world)] world: &ExtractWorld, kind: String) {
    let database = world
        .database_path
        .borrow()
        .clone()
        .expect("database path prepared");
    let invocation = [
        "mapfeed".to_owned(),
        "extract".to_owned(),
        format!("--{ARG_DATABASE}"),
        database.into_string(),
        format!("--{ARG_KIND}"),
        kind,
    ];
    let outcome = Cli::try_parse_from(invocation)
        .map_err(CliError::ArgumentParsing)
        .and_then(|cli| match cli.command {
            Command::Extract(args) => resolve_extract_config(args),
        })
        .and_then(|config| {
            let mut output = Vec::new();
            run_extract_with(&config, &mut output).map(|_| output)
        });
    world.outcome.replace(Some(outcome));
}

#[then("the output holds {count} node lines")]
fn node_lines(#[from(world)] world: &ExtractWorld, count: usize) {
    let lines = json_lines(&world.output());
    assert_eq!(lines.len(), count);
    assert!(lines.iter().all(|line| line["type"] == "node"));
}

#[then("every line names the owning user")]
fn lines_attributed(#[from(world)] world: &ExtractWorld) {
    for line in json_lines(&world.output()) {
        let id = line["id"].as_u64().expect("numeric id");
        assert_eq!(line["uid"], id * 10);
        assert_eq!(line["display_name"], format!("user{id}").as_str());
    }
}

#[then("the CLI reports that the database file is missing")]
fn reports_missing_database(#[from(world)] world: &ExtractWorld) {
    let borrowed = world.outcome.borrow();
    let error = borrowed
        .as_ref()
        .expect("command was run")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingSourceFile { field, path } => {
            assert_eq!(*field, ARG_DATABASE);
            assert!(path.ends_with("missing.db"), "unexpected path {path:?}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[then("argument parsing fails")]
fn argument_parsing_fails(#[from(world)] world: &ExtractWorld) {
    let borrowed = world.outcome.borrow();
    match borrowed.as_ref().expect("command was run") {
        Err(CliError::ArgumentParsing(_)) => {}
        other => panic!("expected an argument parsing error, found {other:?}"),
    }
}

macro_rules! register_extract_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/extract_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: ExtractWorld) {
            let _ = world;
        }
    };
}

register_extract_scenario!(streaming_nodes, "streaming nodes from a rollup database");
register_extract_scenario!(rejecting_missing_database, "rejecting a missing database");
register_extract_scenario!(rejecting_unknown_kind, "rejecting an unknown record kind");
