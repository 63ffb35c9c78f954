/// Template Linter — reports broken wildcards, unknown keywords, and cycles.
///
/// Usage: template_linter <library_file_or_dir>

use prompt_engine::core::library::TemplateLibrary;
use prompt_engine::core::lint::lint;
use std::path::Path;
use std::process;

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: template_linter <library_file_or_dir>");
        process::exit(0);
    }

    let mut library = TemplateLibrary::default();
    let library_path = Path::new(&args[1]);

    if library_path.is_file() {
        match TemplateLibrary::load(library_path) {
            Ok(lib) => library.merge(lib),
            Err(e) => {
                eprintln!("ERROR: Failed to load library file: {}", e);
                process::exit(1);
            }
        }
    } else if library_path.is_dir() {
        load_libraries_recursive(library_path, &mut library);
    } else {
        eprintln!("ERROR: Path '{}' does not exist", args[1]);
        process::exit(1);
    }

    println!("Loaded {} keywords", library.len());

    let report = lint(&library);

    println!("\n=== Template Lint Report ===\n");

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }

    for error in &report.errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        report.errors.len(),
        report.warnings.len()
    );

    if report.is_clean() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn load_libraries_recursive(dir: &Path, library: &mut TemplateLibrary) {
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                load_libraries_recursive(&path, library);
                continue;
            }
            let ext = path.extension().and_then(|s| s.to_str());
            if !matches!(ext, Some("ron") | Some("yaml") | Some("yml")) {
                continue;
            }
            match TemplateLibrary::load(&path) {
                Ok(lib) => {
                    println!("  Loaded: {}", path.display());
                    library.merge(lib);
                }
                Err(e) => {
                    eprintln!("  ERROR loading {}: {}", path.display(), e);
                }
            }
        }
    }
}
