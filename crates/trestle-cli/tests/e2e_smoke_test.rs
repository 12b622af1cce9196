use std::{fs, path::PathBuf};

use tempfile::tempdir;

use trestle_cli::{Args, run};

/// Demo grammars live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Collects all .ebnf files from a directory
fn collect_grammar_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("ebnf")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args_for(input: &PathBuf, output: &PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        symbols: Vec::new(),
        stacked: false,
        config: Some(demos_path().join("config.toml").to_string_lossy().to_string()),
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_grammar_files(demos_path());

    assert!(!demos.is_empty(), "No demo grammars found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &demos {
        let output_dir = temp_dir
            .path()
            .join(demo_path.file_stem().unwrap().to_string_lossy().to_string());
        let args = args_for(demo_path, &output_dir);

        match run(&args) {
            Ok(report) if report.is_success() && !report.written().is_empty() => {
                for path in report.written() {
                    let svg = fs::read_to_string(path).expect("Failed to read output");
                    assert!(svg.contains("<svg"), "{} is not SVG", path.display());
                }
            }
            Ok(report) => {
                let reasons: Vec<String> = report
                    .failures()
                    .iter()
                    .map(|(symbol, err)| format!("{symbol}: {err}"))
                    .collect();
                failed_demos.push((demo_path.clone(), reasons.join("; ")));
            }
            Err(e) => failed_demos.push((demo_path.clone(), e.to_string())),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} demos passed", demos.len());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_grammar_files(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_dir = temp_dir.path().join("errors");
        let args = args_for(demo_path, &output_dir);

        if run(&args).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }
}

#[test]
fn e2e_unknown_symbol_is_skipped() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("expression.ebnf");
    let output_dir = temp_dir.path().to_path_buf();
    let args = Args {
        symbols: vec![
            "term".to_string(),
            "no_such_rule".to_string(),
            "factor".to_string(),
        ],
        ..args_for(&input, &output_dir)
    };

    let report = run(&args).expect("Grammar should parse");
    assert!(!report.is_success());
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].0, "no_such_rule");
    assert_eq!(report.written().len(), 2);
    assert!(output_dir.join("term.svg").is_file());
    assert!(output_dir.join("factor.svg").is_file());
}

#[test]
fn e2e_stacked_writes_one_file() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = demos_path().join("json.ebnf");
    let output_dir = temp_dir.path().to_path_buf();
    let args = Args {
        stacked: true,
        ..args_for(&input, &output_dir)
    };

    let report = run(&args).expect("Failed to render stacked diagram");
    assert!(report.is_success());
    assert_eq!(report.written(), [output_dir.join("json.svg")]);
    let svg = fs::read_to_string(output_dir.join("json.svg")).unwrap();
    assert!(svg.contains("member"));
}
