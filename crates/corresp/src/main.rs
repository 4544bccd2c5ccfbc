//! `corresp` command-line front end.
//!
//! Loads the registry, runs one pipeline operation and prints the result as
//! JSON. Failures print `{"error": <kind>, "detail": <message>}` and exit 1.

use std::{process::ExitCode, sync::Arc};

use anyhow::{bail, Context};
use serde_json::{json, Value};

use corresp_core::{config::Config, pipeline::Pipeline, registry::RegistryStore};
use corresp_yadisk::{HttpCsvSource, YandexDiskClient};

const DEFAULT_FULLTEXT_LIMIT: usize = 5;

const USAGE: &str = "usage: corresp <command> [args]

commands:
  objects                              list registered objects
  files <object>                       list files in an object's folder
  text <object> <file>                 extracted text of one file (truncated)
  fulltext <object> [limit] [offset]   extracted text of a window of PDF/DOCX files
  analyze <object> <file>              classify one file and show a preview
  reload                               reload the registry and report the object count";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Objects,
    Files { object: String },
    Text { object: String, file: String },
    Fulltext { object: String, limit: usize, offset: usize },
    Analyze { object: String, file: String },
    Reload,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let Some((cmd, rest)) = args.split_first() else {
        bail!("missing command");
    };

    let arg = |i: usize, name: &str| -> anyhow::Result<String> {
        rest.get(i)
            .cloned()
            .with_context(|| format!("{cmd}: missing <{name}>"))
    };
    let number = |i: usize, name: &str, default: usize| -> anyhow::Result<usize> {
        match rest.get(i) {
            Some(v) => v
                .parse()
                .with_context(|| format!("{cmd}: <{name}> must be a number, got {v:?}")),
            None => Ok(default),
        }
    };

    Ok(match cmd.as_str() {
        "objects" => Command::Objects,
        "files" => Command::Files {
            object: arg(0, "object")?,
        },
        "text" => Command::Text {
            object: arg(0, "object")?,
            file: arg(1, "file")?,
        },
        "fulltext" => Command::Fulltext {
            object: arg(0, "object")?,
            limit: number(1, "limit", DEFAULT_FULLTEXT_LIMIT)?,
            offset: number(2, "offset", 0)?,
        },
        "analyze" => Command::Analyze {
            object: arg(0, "object")?,
            file: arg(1, "file")?,
        },
        "reload" => Command::Reload,
        other => bail!("unknown command: {other}"),
    })
}

async fn run(pipeline: &Pipeline, command: Command) -> corresp_core::Result<Value> {
    Ok(match command {
        Command::Objects => serde_json::to_value(pipeline.list_objects())?,
        Command::Files { object } => {
            serde_json::to_value(pipeline.list_object_files(&object).await?)?
        }
        Command::Text { object, file } => {
            let text = pipeline.get_file_text(&object, &file).await?;
            json!({ "file_name": file, "text": text })
        }
        Command::Fulltext {
            object,
            limit,
            offset,
        } => serde_json::to_value(pipeline.get_object_fulltext(&object, limit, offset).await?)?,
        Command::Analyze { object, file } => {
            serde_json::to_value(pipeline.analyze_file(&object, &file).await?)?
        }
        Command::Reload => {
            let count = pipeline.registry().reload().await?;
            json!({ "objects": count })
        }
    })
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("failed to render output: {e}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e:#}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match start_and_run(command).await {
        Ok(value) => {
            print_json(&value);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            print_json(&json!({ "error": e.kind(), "detail": e.to_string() }));
            ExitCode::FAILURE
        }
    }
}

async fn start_and_run(command: Command) -> corresp_core::Result<Value> {
    corresp_core::logging::init("corresp")?;

    let cfg = Arc::new(Config::load()?);

    let source = Arc::new(HttpCsvSource::from_config(&cfg)?);
    let registry = Arc::new(RegistryStore::new(source));
    // Registry load failures are fatal at startup.
    registry.reload().await?;

    let storage = Arc::new(YandexDiskClient::from_config(&cfg)?);
    let pipeline = Pipeline::new(cfg, registry, storage);

    run(&pipeline, command).await
}
