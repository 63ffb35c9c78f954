/// Preview — interactive generation shell for trying out template libraries.
///
/// Usage: preview --library <path> [--library <path> ...] [--seed <n>]
///
/// Commands:
///   gen <keyword> [n] [%]   — generate n picks (repeats allowed with %)
///   bulk <keyword> <n>      — generate n prompts with variety stats
///   keywords                — list valid keywords
///   lint                    — run the lint pass over the loaded library
///   seed <n>                — set RNG seed
///   help                    — list commands
///   quit                    — exit

use prompt_engine::core::engine::PromptEngine;
use std::collections::HashSet;
use std::io::{self, BufRead, Write};

fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut libraries = Vec::new();
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--library" if i + 1 < args.len() => {
                i += 1;
                libraries.push(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = PromptEngine::builder().seed(seed);
    for path in &libraries {
        builder = builder.library_path(path);
    }
    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    println!("Loaded {} keywords", engine.library().len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let mut current_seed = seed;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("preview> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_lowercase();

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => {
                print_help();
            }
            "gen" | "g" => {
                if parts.len() < 2 {
                    println!("Usage: gen <keyword> [n] [%]");
                    continue;
                }
                let keyword = parts[1];
                // a lone "%" keeps the default amount
                let amount: usize = match parts.get(2).map(|n| (n, n.trim_end_matches('%'))) {
                    Some((_, "")) | None => 1,
                    Some((n, count)) => match count.parse() {
                        Ok(count) if count > 0 => count,
                        _ => {
                            println!("Invalid count: {}", n);
                            continue;
                        }
                    },
                };
                let allow_repeat = parts[2..].iter().any(|p| p.ends_with('%'));

                if !engine.contains_keyword(keyword) {
                    println!("(note: '{}' is not a known keyword)", keyword);
                }
                println!("\n{}\n", engine.generate_many(keyword, amount, allow_repeat));
            }
            "bulk" => {
                if parts.len() < 3 {
                    println!("Usage: bulk <keyword> <n>");
                    continue;
                }
                let count: usize = match parts[2].parse() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        println!("Invalid count: {}", parts[2]);
                        continue;
                    }
                };
                let prompts = engine.generate_variants(parts[1], count);
                print_bulk_stats(&prompts, &engine.keywords());
            }
            "keywords" | "k" => {
                println!("Valid keywords: {}", engine.keywords().join(", "));
            }
            "lint" => {
                let report = engine.lint();
                for warning in &report.warnings {
                    println!("WARNING: {}", warning);
                }
                for error in &report.errors {
                    println!("ERROR: {}", error);
                }
                println!(
                    "{} errors, {} warnings",
                    report.errors.len(),
                    report.warnings.len()
                );
            }
            "seed" => {
                if parts.len() < 2 {
                    println!("Current seed: {}", current_seed);
                    continue;
                }
                match parts[1].parse::<u64>() {
                    Ok(s) => {
                        current_seed = s;
                        engine.reseed(current_seed);
                        println!("Seed set to {}", current_seed);
                    }
                    Err(_) => {
                        println!("Invalid seed: {}", parts[1]);
                    }
                }
            }
            _ => {
                println!("Unknown command: {}. Type 'help' for commands.", cmd);
            }
        }
    }
}

fn print_bulk_stats(prompts: &[String], keywords: &[&str]) {
    println!("\n=== Bulk Generation: {} prompts ===\n", prompts.len());

    let unique: HashSet<&String> = prompts.iter().collect();
    println!("Unique prompts: {} / {}", unique.len(), prompts.len());

    let avg_len: f64 = if prompts.is_empty() {
        0.0
    } else {
        prompts.iter().map(|p| p.len() as f64).sum::<f64>() / prompts.len() as f64
    };
    println!("Average length: {:.0} chars", avg_len);

    // Upper-cased keywords in the output mean a node fell back
    let fallbacks = prompts
        .iter()
        .filter(|p| keywords.iter().any(|k| p.contains(&k.to_uppercase())))
        .count();
    println!("Prompts with fallbacks: {}", fallbacks);

    println!("\n--- Samples ---");
    for prompt in prompts.iter().take(5) {
        println!("  {}", prompt);
    }
    println!();
}

fn print_usage() {
    println!("Usage: preview --library <path> [--library <path> ...] [--seed <n>]");
}

fn print_help() {
    println!("Commands:");
    println!("  gen <keyword> [n] [%]   Generate n picks; % allows repeats");
    println!("  bulk <keyword> <n>      Generate n prompts with variety stats");
    println!("  keywords                List valid keywords");
    println!("  lint                    Check the loaded library for problems");
    println!("  seed <n>                Set RNG seed");
    println!("  help                    Show this help");
    println!("  quit                    Exit");
}
