// Command-line interface for quill
//
// This binary converts notes between the editor's HTML and the constrained
// XML markup they are stored in, using the quill-enml crate.
//
// Saving runs the full pipeline (external HTML repair, encryption
// placeholder substitution, structural rewriting) and prints the resulting
// markup. Since the CLI has no editor session there are no passwords to
// encrypt with; documents containing encryption placeholders convert
// partially and the unresolved slots are reported on stderr.
//
// Usage:
//  quill save <input.html> [--output <file>] [--report]   - Editor HTML to note markup
//  quill load <input.enml> [--output <file>]              - Note markup to editor HTML
//  quill check <input.enml>                               - Validate stored markup

use clap::{Arg, ArgAction, Command, ValueHint};
use quill_config::{Loader, QuillConfig};
use quill_enml::{format_for_editor, validate, EnmlFormat, PasswordStore, TagPolicy, UnavailableCipher};
use std::fs;

fn build_cli() -> Command {
    Command::new("quill")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert notes between editor HTML and storage markup")
        .long_about(
            "quill is a command-line tool for working with stored note markup.\n\n\
            Commands:\n  \
            - save:  Convert editor HTML into validated note markup\n  \
            - load:  Convert stored note markup back into editable HTML\n  \
            - check: Validate stored markup against the element whitelist\n\n\
            Saving shells out to HTML Tidy to repair the editor's markup first.\n\
            Set QUILL_TIDY_BIN or the [normalize] config section to control the\n\
            binary and its flags.\n\n\
            Examples:\n  \
            quill save note.html                    # Markup to stdout\n  \
            quill save note.html -o note.enml       # Markup to a file\n  \
            quill save note.html --report           # Full JSON conversion report\n  \
            quill load note.enml                    # Editable HTML to stdout\n  \
            quill check note.enml                   # Whitelist validation",
        )
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a quill.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("save")
                .about("Convert editor HTML into note markup")
                .long_about(
                    "Convert an editor HTML document into validated note markup.\n\n\
                    The document is repaired with HTML Tidy, encryption placeholders\n\
                    are substituted, and every element is rewritten into its storage\n\
                    form. Elements outside the dialect's whitelist are deleted.\n\n\
                    With --report the full conversion result is printed as JSON:\n\
                    the markup, the referenced resource identifiers in document\n\
                    order, and any unresolved encryption slots.\n\n\
                    Examples:\n  \
                    quill save note.html                   # Markup to stdout\n  \
                    quill save note.html -o note.enml      # Markup to a file\n  \
                    quill save note.html --report          # JSON report to stdout",
                )
                .arg(
                    Arg::new("input")
                        .help("Input HTML file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Print the full conversion result as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("load")
                .about("Convert note markup back into editable HTML")
                .arg(
                    Arg::new("input")
                        .help("Input note markup file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate stored markup against the element whitelist")
                .long_about(
                    "Parse a stored note and report every element outside the\n\
                    dialect's whitelist, one tag name per line, in document order.\n\
                    Exits non-zero when the markup is malformed or any violation\n\
                    is found.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input note markup file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    let _logger = init_logging(&config);

    match matches.subcommand() {
        Some(("save", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            let report = sub_matches.get_flag("report");
            handle_save_command(input, output, report, &config);
        }
        Some(("load", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_load_command(input, output);
        }
        Some(("check", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            handle_check_command(input);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn handle_save_command(input: &str, output: Option<&str>, report: bool, config: &QuillConfig) {
    let html = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let normalizer = config.normalize.normalizer().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    // No editor session, so no passwords: placeholder blocks stay as-is and
    // get reported as unresolved.
    let format = EnmlFormat::new(Box::new(normalizer), Box::new(UnavailableCipher));
    let result = format.convert(&html, &PasswordStore::new()).unwrap_or_else(|e| {
        eprintln!("Conversion error: {e}");
        std::process::exit(1);
    });

    for slot in &result.unresolved_slots {
        eprintln!("Warning: encryption slot {slot:?} could not be resolved; block left unencrypted");
    }

    let text = if report {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing report: {e}");
                std::process::exit(1);
            }
        }
    } else {
        result.enml
    };

    write_output(output, &text);
}

fn handle_load_command(input: &str, output: Option<&str>) {
    let enml = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let html = format_for_editor(&enml).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    write_output(output, &html);
}

fn handle_check_command(input: &str) {
    let enml = fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Error reading file '{input}': {e}");
        std::process::exit(1);
    });

    let violations = validate(&enml, &TagPolicy::default()).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    if violations.is_empty() {
        println!("OK");
        return;
    }
    for tag in &violations {
        println!("{tag}");
    }
    std::process::exit(1);
}

fn write_output(output: Option<&str>, text: &str) {
    match output {
        Some(path) => {
            fs::write(path, text).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => println!("{text}"),
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> QuillConfig {
    let loader = Loader::new().with_optional_file("quill.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

// The handle must outlive the conversion or log records stop flowing.
fn init_logging(config: &QuillConfig) -> Option<flexi_logger::LoggerHandle> {
    // Logging is advisory for a CLI run; a bad level falls back to stderr
    // warnings rather than aborting the conversion.
    match flexi_logger::Logger::try_with_str(&config.logging.level) {
        Ok(logger) => match logger.start() {
            Ok(handle) => Some(handle),
            Err(e) => {
                eprintln!("Warning: could not start logger: {e}");
                None
            }
        },
        Err(e) => {
            eprintln!("Warning: invalid logging.level in configuration: {e}");
            None
        }
    }
}
