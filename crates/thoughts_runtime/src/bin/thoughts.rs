//! Thoughts CLI entry point.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use thoughts_engine::{Engine, EngineConfig};
use thoughts_foundation::Term;
use thoughts_runtime::Repl;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<PathBuf>,
    assertions: Vec<String>,
    batch_mode: bool,
    json_output: bool,
    show_help: bool,
    show_version: bool,
    keep_arcs: bool,
    include_seq: bool,
    max_steps: Option<usize>,
    max_arcs: Option<usize>,
    seed: Option<u64>,
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value_of<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid {flag} value: {value}"))
}

fn parse_args(args: &[String]) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "-j" | "--json" => config.json_output = true,
            "--keep-arcs" => config.keep_arcs = true,
            "--include-seq" => config.include_seq = true,
            flag @ ("-e" | "--assert") => {
                let text = value_of(args, &mut i, flag)?;
                config.assertions.push(text.to_string());
            }
            flag @ "--max-steps" => {
                config.max_steps = Some(number(value_of(args, &mut i, flag)?, flag)?);
            }
            flag @ "--max-arcs" => {
                config.max_arcs = Some(number(value_of(args, &mut i, flag)?, flag)?);
            }
            flag @ "--seed" => {
                config.seed = Some(number(value_of(args, &mut i, flag)?, flag)?);
            }
            flag @ "--log-level" => {
                config.log_level = Some(value_of(args, &mut i, flag)?.to_string());
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => config.files.push(PathBuf::from(path)),
        }
        i += 1;
    }

    Ok(config)
}

fn init_logging(level: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn engine_config(config: &CliConfig) -> EngineConfig {
    let mut engine_config = if config.batch_mode {
        EngineConfig::default()
    } else {
        EngineConfig::interactive()
    };
    if config.keep_arcs {
        engine_config = engine_config.with_keep_arcs(true);
    }
    if config.include_seq {
        engine_config = engine_config.with_include_seq(true);
    }
    if let Some(max) = config.max_steps {
        engine_config = engine_config.with_max_steps(max);
    }
    if let Some(max) = config.max_arcs {
        engine_config = engine_config.with_max_arcs(max);
    }
    if let Some(seed) = config.seed {
        engine_config = engine_config.with_seed(seed);
    }
    engine_config
}

fn assert_text(
    engine: &mut Engine,
    text: &str,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let term = if text.trim_start().starts_with('[') {
        Term::parse_json(text)?
    } else {
        Term::atom(text)
    };
    let conclusions = engine.process(&term)?;

    for line in engine.knowledge_mut().drain_output() {
        println!("{line}");
    }
    for conclusion in conclusions {
        if json_output {
            println!("{}", serde_json::to_string(&conclusion.to_json())?);
        } else {
            println!("{conclusion}");
        }
    }
    engine.clear_items();
    Ok(())
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(&args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("thoughts {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(config.log_level.as_deref())?;

    let mut engine = Engine::with_config(engine_config(&config));
    thoughts_stdlib::register_builtins(&mut engine);

    for file in &config.files {
        let name = engine.load_rules_from_file(file, None)?;
        info!(path = %file.display(), ruleset = %name, "loaded rule file");
    }

    for text in &config.assertions {
        assert_text(&mut engine, text, config.json_output)?;
    }

    if config.batch_mode {
        return Ok(());
    }

    let mut repl = Repl::new()?.with_engine(engine);
    if !config.files.is_empty() || !config.assertions.is_empty() {
        repl = repl.without_banner();
    }

    repl.run()?;
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mThoughts\x1b[0m - Forward-chaining rule engine over text and JSON

\x1b[1mUSAGE:\x1b[0m
    thoughts [OPTIONS] [RULE FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [RULE FILES...]    JSON rule files to load before starting the console

\x1b[1mOPTIONS:\x1b[0m
    -h, --help             Print help information
    -V, --version          Print version information
    -b, --batch            Process assertions and exit (no console)
    -e, --assert TEXT      Assert TEXT after loading rules (repeatable)
    -j, --json             Print conclusions as JSON

\x1b[1mENGINE OPTIONS:\x1b[0m
    --keep-arcs            Keep partial sequence matches between inputs
    --include-seq          Keep positions on printed conclusions
    --max-steps N          Limit command dispatches per input (default 10000)
    --max-arcs N           Limit active arcs (default 1000)
    --seed N               Seed for #random
    --log-level FILTER     Log filter, e.g. debug or thoughts_engine=trace

\x1b[1mEXAMPLES:\x1b[0m
    thoughts rules.json                     Load rules, then start the console
    thoughts -b rules.json -e \"hello\"       Assert once and exit
    thoughts --seed 7 -b games.json -e \"roll\"

\x1b[1mCONSOLE COMMANDS:\x1b[0m
    #log                   Show the engine trace
    #items                 Show stored items
    #clear-arcs            Drop partial sequence matches
    #load PATH [NAME]      Load a rule file
    #exit                  Exit (or Ctrl+D)"
    );
}
