// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Gobook CLI entrypoint.
//!
//! Reads SGF files (or a saved spec), generates positions and prints the diagrams to stdout.
//! Logs go to stderr.

use std::error::Error;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use gobook::model::{BoardRegion, DiagramType, PositionType, SgfSource, Spec};
use gobook::pipeline::Pipeline;
use gobook::store;
use gobook::tree::MoveTree;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [options] <sgf-file>...\n  {program} [options] --spec <spec.json>\n  {program} --schema\n\nOptions:\n  --ids <a,b,...>          game ids for the SGF files, in order\n  --type <TYPE>            EXAMPLE, GAME_COMMENTARY or PROBLEM (root grouping type)\n  --diagram-type <TAG>     renderer to use (ASCII, UNICODE)\n  --skip <N>               skip the first N diagrams\n  --max <N>                stop after diagram N\n  --region <REGION>        ALL, AUTO, TOP_LEFT, ... (board crop)\n  --emit-spec              print the processed spec as JSON instead of diagrams\n  --schema                 print the spec JSON schema\n  -v, --verbose            debug logging on stderr\n  -h, --help               show this help"
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    sgf_files: Vec<String>,
    spec_file: Option<String>,
    ids: Option<Vec<String>>,
    position_type: Option<PositionType>,
    diagram_type: Option<String>,
    skip: Option<usize>,
    max: Option<usize>,
    region: Option<BoardRegion>,
    emit_spec: bool,
    schema: bool,
    verbose: bool,
    help: bool,
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value);
    Ok(())
}

fn set_flag(flag: &mut bool) -> Result<(), ()> {
    if *flag {
        return Err(());
    }
    *flag = true;
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--spec" => set_once(&mut options.spec_file, args.next().ok_or(())?)?,
            "--ids" => {
                let raw = args.next().ok_or(())?;
                let ids: Vec<String> = raw.split(',').map(|id| id.trim().to_owned()).collect();
                if ids.iter().any(String::is_empty) {
                    return Err(());
                }
                set_once(&mut options.ids, ids)?;
            }
            "--type" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.position_type, PositionType::from_str(&raw).map_err(|_| ())?)?;
            }
            "--diagram-type" => {
                let raw = args.next().ok_or(())?;
                if raw.trim().is_empty() {
                    return Err(());
                }
                set_once(&mut options.diagram_type, raw)?;
            }
            "--skip" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.skip, raw.parse().map_err(|_| ())?)?;
            }
            "--max" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.max, raw.parse().map_err(|_| ())?)?;
            }
            "--region" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.region, BoardRegion::from_str(&raw).map_err(|_| ())?)?;
            }
            "--emit-spec" => set_flag(&mut options.emit_spec)?,
            "--schema" => set_flag(&mut options.schema)?,
            "-v" | "--verbose" => set_flag(&mut options.verbose)?,
            "-h" | "--help" => set_flag(&mut options.help)?,
            _ if arg.starts_with('-') => return Err(()),
            _ => options.sgf_files.push(arg),
        }
    }

    if options.help || options.schema {
        return Ok(options);
    }
    if options.spec_file.is_some() == !options.sgf_files.is_empty() {
        return Err(());
    }
    if let Some(ids) = &options.ids {
        if options.spec_file.is_some() || ids.len() != options.sgf_files.len() {
            return Err(());
        }
    }

    Ok(options)
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn build_spec(options: &CliOptions) -> Result<Spec, Box<dyn Error>> {
    if let Some(path) = &options.spec_file {
        let mut spec = store::load_spec(Path::new(path))?;
        if let Some(position_type) = options.position_type {
            // Saved specs carry their type on the root grouping, which wins over the default.
            let mut spec_options = spec.spec_options().clone();
            spec_options.position_type = position_type;
            spec.set_spec_options(spec_options)?;
            spec.root_grouping_mut().set_position_type(Some(position_type));
        }
        return Ok(spec);
    }

    let mut sources = Vec::with_capacity(options.sgf_files.len());
    for (idx, file) in options.sgf_files.iter().enumerate() {
        let contents = std::fs::read_to_string(file).map_err(|err| format!("{file}: {err}"))?;
        let source = SgfSource::new(contents);
        sources.push(match &options.ids {
            Some(ids) => source.with_alias(ids[idx].clone()),
            None => source,
        });
    }

    let mut spec_options = gobook::model::SpecOptions::default();
    if let Some(position_type) = options.position_type {
        spec_options.position_type = position_type;
    }
    Ok(Spec::create::<MoveTree>(
        &sources,
        spec_options,
        Default::default(),
        Default::default(),
    )?)
}

fn run(options: CliOptions) -> Result<(), Box<dyn Error>> {
    if options.schema {
        println!("{}", serde_json::to_string_pretty(&store::spec_json_schema())?);
        return Ok(());
    }

    let mut pipeline = Pipeline::<MoveTree>::from_spec(build_spec(&options)?).process()?;

    if options.emit_spec {
        println!("{}", store::to_json_string(pipeline.spec())?);
        return Ok(());
    }

    let mut diagram_options = pipeline.spec().diagram_options().clone();
    if let Some(tag) = options.diagram_type {
        diagram_options.diagram_type = DiagramType::new(tag);
    }
    if let Some(skip) = options.skip {
        diagram_options.skip_diagrams = skip;
    }
    if options.max.is_some() {
        diagram_options.max_diagrams = options.max;
    }
    if let Some(region) = options.region {
        diagram_options.board_region = region;
    }
    pipeline.set_diagram_options(diagram_options.clone())?;

    let inline = pipeline.registry().create(&diagram_options.diagram_type)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    pipeline.render_diagrams_stream(|diagram, meta| {
        writeln!(out, "# {} ({}-{})", diagram.id, meta.starting_move_num, meta.ending_move_num)?;
        writeln!(out, "{}", diagram.rendered)?;
        if let Some(comment) = &meta.comment {
            writeln!(out, "{}", inline.render_inline(comment, &diagram_options))?;
        }
        writeln!(out)?;
        Ok(())
    })?;
    Ok(())
}

fn main() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "gobook".to_owned());

    let options = match parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            print_usage(&program);
            std::process::exit(2);
        }
    };
    if options.help {
        print_usage(&program);
        return;
    }

    init_logging(options.verbose);
    if let Err(err) = run(options) {
        eprintln!("gobook: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use gobook::model::{BoardRegion, PositionType};

    use super::{parse_options, CliOptions};

    fn parse(args: &[&str]) -> Result<CliOptions, ()> {
        parse_options(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_sgf_files_with_ids() {
        let options = parse(&["--ids", "a, b", "one.sgf", "two.sgf"]).expect("parse options");
        assert_eq!(options.sgf_files, vec!["one.sgf", "two.sgf"]);
        assert_eq!(options.ids, Some(vec!["a".to_owned(), "b".to_owned()]));
    }

    #[test]
    fn parses_diagram_flags() {
        let options = parse(&[
            "--type",
            "PROBLEM",
            "--diagram-type",
            "UNICODE",
            "--skip",
            "2",
            "--max",
            "5",
            "--region",
            "TOP_RIGHT",
            "-v",
            "game.sgf",
        ])
        .expect("parse options");
        assert_eq!(options.position_type, Some(PositionType::Problem));
        assert_eq!(options.diagram_type.as_deref(), Some("UNICODE"));
        assert_eq!((options.skip, options.max), (Some(2), Some(5)));
        assert_eq!(options.region, Some(BoardRegion::TopRight));
        assert!(options.verbose);
    }

    #[test]
    fn parses_spec_and_schema_modes() {
        let options = parse(&["--spec", "book.json", "--emit-spec"]).expect("parse options");
        assert_eq!(options.spec_file.as_deref(), Some("book.json"));
        assert!(options.emit_spec);

        let options = parse(&["--schema"]).expect("parse options");
        assert!(options.schema);
        assert!(parse(&["--help"]).expect("parse options").help);
    }

    #[test]
    fn rejects_missing_or_conflicting_inputs() {
        parse(&[]).unwrap_err();
        parse(&["--spec", "book.json", "game.sgf"]).unwrap_err();
        parse(&["--ids", "a", "--spec", "book.json"]).unwrap_err();
        parse(&["--ids", "a,b", "game.sgf"]).unwrap_err();
        parse(&["--ids", "a,", "game.sgf"]).unwrap_err();
    }

    #[test]
    fn rejects_bad_values_and_duplicates() {
        parse(&["--type", "OPENING", "game.sgf"]).unwrap_err();
        parse(&["--region", "MIDDLE", "game.sgf"]).unwrap_err();
        parse(&["--skip", "-1", "game.sgf"]).unwrap_err();
        parse(&["--max"]).unwrap_err();
        parse(&["--emit-spec", "--emit-spec", "game.sgf"]).unwrap_err();
        parse(&["--skip", "1", "--skip", "2", "game.sgf"]).unwrap_err();
        parse(&["--nope", "game.sgf"]).unwrap_err();
    }
}
