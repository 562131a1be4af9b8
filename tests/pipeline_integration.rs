//! End-to-end runs of the three stages over a temporary work directory.

mod common;

use std::fs;
use std::fs::File;
use std::io::BufReader;

use common::{pipeline, read, records, work_dir, DUNE};
use shelver::{BookReader, DiagnosticKind, Genre, ShelverError};

#[test]
fn test_single_valid_record_reaches_its_dataset() {
    let dir = work_dir(&["books.csv"], &[("books.csv", &format!("{DUNE}\n"))]);
    let report = pipeline(dir.path()).run().unwrap();

    assert_eq!(report.split.total_accepted(), 1);
    assert_eq!(report.split.total_rejected(), 0);
    assert_eq!(report.validation.total_accepted(), 1);
    assert_eq!(report.validation.total_rejected(), 0);

    assert_eq!(
        read(dir.path(), "Sports_Sports_Memorabilia.csv.txt"),
        format!("{DUNE}\n")
    );
    assert_eq!(read(dir.path(), "syntax_error_file.txt"), "");
    assert_eq!(read(dir.path(), "semantic_error_file.txt"), "");

    let library = pipeline(dir.path()).load();
    assert_eq!(library.total(), 1);
    let book = &library.books(Genre::SportsMemorabilia)[0];
    assert_eq!(book.title, "Dune");
    assert_eq!(book.authors, "Herbert");
    assert!((book.price - 12.99).abs() < f64::EPSILON);
    assert_eq!(book.isbn, "0201038013");
    assert_eq!(book.year, 1999);
}

#[test]
fn test_every_genre_gets_text_and_binary_sinks() {
    let dir = work_dir(&["a.csv"], &[("a.csv", &records("CCB", 2))]);
    pipeline(dir.path()).run().unwrap();

    for genre in Genre::ALL {
        assert!(dir.path().join(genre.text_file_name()).exists(), "{genre}");
        assert!(dir.path().join(genre.binary_file_name()).exists(), "{genre}");
    }
    let library = pipeline(dir.path()).load();
    assert_eq!(library.count(Genre::CartoonsComics), 2);
    assert_eq!(library.count(Genre::MoviesTv), 0);
}

#[test]
fn test_syntax_errors_are_written_with_source_and_reason() {
    let input = "\
a,b,1,0201038013,CCB,2000,extra
a,b,1,0201038013,CCB
a,,1,0201038013,CCB,2000
a,b,1,0201038013,XYZ,2000
";
    let dir = work_dir(&["bad.csv"], &[("bad.csv", input)]);
    let report = pipeline(dir.path()).split().unwrap();

    assert_eq!(report.total_accepted(), 0);
    assert_eq!(report.rejected[&DiagnosticKind::TooManyFields], 1);
    assert_eq!(report.rejected[&DiagnosticKind::TooFewFields], 1);
    assert_eq!(report.rejected[&DiagnosticKind::MissingField], 1);
    assert_eq!(report.rejected[&DiagnosticKind::UnknownGenre], 1);

    let errors = read(dir.path(), "syntax_error_file.txt");
    assert_eq!(errors.matches("syntax error in file: bad.csv").count(), 4);
    assert!(errors.contains("Error: Too many fields\nRecord: a,b,1,0201038013,CCB,2000,extra\n"));
    assert!(errors.contains("Error: Too few fields\n"));
    assert!(errors.contains("Error: missing authors\n"));
    assert!(errors.contains("Error: invalid genre\n"));
}

#[test]
fn test_semantic_errors_are_written_per_dataset() {
    let input = "\
neg,a,-1,0201038013,MTV,2000
isbn10,a,1,0201038014,MTV,2000
isbn13,a,1,9780201038010,MTV,2000
old,a,1,0201038013,MTV,1994
new,a,1,0201038013,MTV,2025
ok,a,1,9780201038019,MTV,2024
";
    let dir = work_dir(&["m.csv"], &[("m.csv", input)]);
    let report = pipeline(dir.path()).run().unwrap();

    assert_eq!(report.split.accepted[&Genre::MoviesTv], 6);
    assert_eq!(report.validation.accepted[&Genre::MoviesTv], 1);
    assert_eq!(report.validation.rejected[&DiagnosticKind::BadPrice], 1);
    assert_eq!(report.validation.rejected[&DiagnosticKind::BadIsbn10], 1);
    assert_eq!(report.validation.rejected[&DiagnosticKind::BadIsbn13], 1);
    assert_eq!(report.validation.rejected[&DiagnosticKind::BadYear], 2);

    let errors = read(dir.path(), "semantic_error_file.txt");
    assert_eq!(
        errors.matches("semantic error in file: Movies_TV.csv").count(),
        5
    );
    assert!(errors.contains("Error: Wrong Price\nRecord: neg,a,-1,0201038013,MTV,2000\n"));
    assert!(errors.contains("Error: Invalid ISBN-10\n"));
    assert!(errors.contains("Error: Invalid ISBN-13\n"));
    assert!(errors.contains("Error: Invalid year\nRecord: old,a,1,0201038013,MTV,1994\n"));

    let library = pipeline(dir.path()).load();
    assert_eq!(library.books(Genre::MoviesTv)[0].title, "ok");
}

#[test]
fn test_missing_input_file_does_not_stop_the_run() {
    let dir = work_dir(
        &["missing.csv", "present.csv"],
        &[("present.csv", &records("TPA", 3))],
    );
    let report = pipeline(dir.path()).run().unwrap();

    assert_eq!(report.split.files_skipped, ["missing.csv"]);
    assert_eq!(report.split.files_processed, ["present.csv"]);
    assert_eq!(report.validation.accepted[&Genre::TrainsPlanesAutomobiles], 3);
}

#[test]
fn test_missing_control_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = pipeline(dir.path()).run().unwrap_err();
    assert!(matches!(err, ShelverError::ControlFile(_)));
}

#[test]
fn test_inputs_are_concatenated_in_control_order() {
    let dir = work_dir(
        &["first.csv", "second.csv"],
        &[
            ("first.csv", "one,a,1,0201038013,OTR,2000\n"),
            ("second.csv", "two,a,1,0201038013,OTR,2000\n"),
        ],
    );
    pipeline(dir.path()).run().unwrap();

    let file = File::open(dir.path().join(Genre::OldTimeRadio.binary_file_name())).unwrap();
    let titles: Vec<String> = BookReader::new(BufReader::new(file))
        .unwrap()
        .map(|book| book.unwrap().title)
        .collect();
    assert_eq!(titles, ["one", "two"]);
}

#[test]
fn test_rerun_overwrites_previous_outputs() {
    let dir = work_dir(&["a.csv"], &[("a.csv", &records("NEB", 4))]);
    pipeline(dir.path()).run().unwrap();
    fs::write(dir.path().join("a.csv"), records("NEB", 1)).unwrap();
    pipeline(dir.path()).run().unwrap();

    assert_eq!(pipeline(dir.path()).load().count(Genre::NostalgiaEclectic), 1);
}

#[test]
fn test_quoted_title_with_comma_survives() {
    let line = r#""Planes, Trains",Ames,5,0201038013,TPA,2010"#;
    let dir = work_dir(&["q.csv"], &[("q.csv", &format!("{line}\n"))]);
    pipeline(dir.path()).run().unwrap();

    let library = pipeline(dir.path()).load();
    assert_eq!(
        library.books(Genre::TrainsPlanesAutomobiles)[0].title,
        "Planes, Trains"
    );
}
