//! Common test helpers shared across the integration suite.

use std::fs;
use std::path::Path;

use shelver::{Pipeline, PipelineConfig};
use tempfile::TempDir;

/// A record that passes both stages.
pub const DUNE: &str = r#""Dune",Herbert,12.99,0201038013,SSM,1999"#;

/// Creates a work directory holding a control file listing `inputs` and
/// one file per `(name, contents)` pair.
///
/// Inputs named in the control file but absent from `files` stay missing.
pub fn work_dir(inputs: &[&str], files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut control = format!("{}\n", inputs.len());
    for name in inputs {
        control.push_str(name);
        control.push('\n');
    }
    fs::write(dir.path().join("part1_input_file_names.txt"), control)
        .expect("write control file");
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).expect("write input file");
    }
    dir
}

/// A quiet pipeline over `dir`.
pub fn pipeline(dir: &Path) -> Pipeline {
    Pipeline::new(PipelineConfig {
        echo_diagnostics: false,
        ..PipelineConfig::in_dir(dir)
    })
}

/// Reads a file in `dir` to a string.
#[allow(dead_code)]
pub fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_else(|_| panic!("read {name}"))
}

/// `count` valid records for `code`, titled `Book 0..count`.
#[allow(dead_code)]
pub fn records(code: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("Book {i},Author {i},{i}.50,0201038013,{code},2001\n"))
        .collect()
}
