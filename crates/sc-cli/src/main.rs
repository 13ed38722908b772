use clap::{Parser, Subcommand};
use std::path::Path;

#[derive(Parser)]
#[command(name = "sc")]
#[command(about = "SC markup to HTML compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render an .sc file to a standalone HTML page
    Build {
        /// Input .sc file
        path: String,
    },

    /// Check an .sc file for errors without writing output
    Check {
        /// Input .sc file
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { path } => cmd_build(&path),
        Command::Check { path } => cmd_check(&path),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn file_name_of(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

fn cmd_build(path: &str) {
    let source = read_source(path);

    let fragment = match sc_html::render_to_string(&source, path, file_name_of(path)) {
        Ok(html) => html,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Write the page next to the source
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out");
    let dir = Path::new(path).parent().unwrap_or(Path::new("."));
    let html_path = dir.join(format!("{stem}.html"));

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"UTF-8\">\n");
    page.push_str(&format!("  <title>{stem}</title>\n"));
    page.push_str("</head>\n<body>\n");
    page.push_str(&fragment);
    page.push_str("</body>\n</html>\n");

    if let Err(e) = std::fs::write(&html_path, &page) {
        eprintln!("Error writing {}: {e}", html_path.display());
        std::process::exit(1);
    }

    eprintln!("Built: {}", html_path.display());
}

fn cmd_check(path: &str) {
    let source = read_source(path);

    if let Err(e) = sc_html::render_to_string(&source, path, file_name_of(path)) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}
