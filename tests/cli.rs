//! End-to-end runs of the nginx-log-parser binary.

use std::{io::Write, process::Command};

use tempfile::{Builder, NamedTempFile};

/// Helper to run the binary and capture output
fn run(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_nginx-log-parser"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute nginx-log-parser");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn log_file(lines: &[&str]) -> NamedTempFile {
    let mut file = Builder::new()
        .prefix("access")
        .suffix(".log")
        .tempfile()
        .expect("Failed to create temp log");
    for line in lines {
        writeln!(file, "{line}").expect("Failed to write temp log");
    }
    file
}

const BOT_1: &str = r#"1.2.3.4 - - [09/Jul/2020:08:00:00 +0000] "GET /wp-admin/install.php HTTP/1.1" 404 0 "-" "Mozilla/5.0""#;
const USER_1: &str = r#"5.6.7.8 - - [09/Jul/2020:09:00:00 +0000] "GET /assets/app.js HTTP/1.1" 200 512 "-" "Mozilla/5.0""#;
const BOT_2: &str = r#"1.2.3.4 - - [09/Jul/2020:17:30:00 +0000] "GET /wp-admin/ HTTP/1.1" 404 0 "-" "Mozilla/5.0""#;

#[test]
fn detailed_day_report_counts_each_visitor_once() {
    let log = log_file(&[BOT_1, USER_1, BOT_2]);
    let path = log.path().to_str().unwrap();

    let (stdout, _, code) = run(&["-day", "09/07/2020", "-detailed", path]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "Detailed Information on 09/07/2020\n\
         Number of bots: 1\n\
         Number of new users who accessed the site: 1\n\
         Number of users who already had accessed the site: 0\n\
         Number of user error requests: 0\n\
         Total number of user views: 1\n"
    );
}

#[test]
fn verbose_report_prints_one_line_per_visitor() {
    let log = log_file(&[BOT_1, USER_1, BOT_2]);
    let path = log.path().to_str().unwrap();

    let (stdout, _, code) = run(&["-day", "09/07/2020", "-detailed", "-verbose", path]);
    assert_eq!(code, 0);
    assert_eq!(stdout.matches("-> 1.2.3.4").count(), 1);
    assert!(stdout.starts_with(
        "09/Jul/2020:08:00:00: Found a bot -> 1.2.3.4\n\
         09/Jul/2020:09:00:00: Found a user -> 5.6.7.8\n\n"
    ));
}

#[test]
fn returning_users_are_detected_across_the_filter() {
    let log = log_file(&[
        r#"5.6.7.8 - - [01/Jul/2020:09:00:00 +0000] "GET /assets/app.js HTTP/1.1" 200 512 "-" "Mozilla/5.0""#,
        USER_1,
        r#"8.8.8.8 - - [09/Jul/2020:10:00:00 +0000] "GET /assets/app.css HTTP/1.1" 200 512 "-" "Mozilla/5.0""#,
        r#"8.8.8.8 - - [12/Jul/2020:10:00:00 +0000] "GET /assets/app.css HTTP/1.1" 200 512 "-" "Mozilla/5.0""#,
    ]);
    let path = log.path().to_str().unwrap();

    let (stdout, _, code) = run(&["-day", "09/07/2020", "-new", "-old", path]);
    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "Found 1 new users who accessed the site on 09/07/2020\n\
         Found 1 users who already had accessed the site on 09/07/2020\n\
         Found 2 users who accessed the site on 09/07/2020\n"
    );
}

#[test]
fn invalid_utf8_lines_are_still_counted() {
    let mut log = log_file(&[USER_1]);
    log.write_all(b"9.9.9.9 - - [09/Jul/2020:11:00:00 +0000] \"GET /\xff HTTP/1.1\" 404 0\n")
        .expect("Failed to write temp log");
    let (stdout, _, code) = run(&[log.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "Found 2 users who accessed the site\n");
}

#[test]
fn unfiltered_report_counts_users() {
    let log = log_file(&[BOT_1, USER_1, BOT_2]);
    let (stdout, _, code) = run(&[log.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "Found 1 users who accessed the site\n");
}

#[test]
fn json_report_is_machine_readable() {
    let log = log_file(&[BOT_1, USER_1, BOT_2]);
    let (stdout, _, code) = run(&["--json", "-year", "2020", log.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert!(stdout.contains(r#""filter": "2020""#));
    assert!(stdout.contains(r#""bots": 1"#));
    assert!(stdout.contains(r#""new_users": 1"#));
}

#[test]
fn broken_timestamps_are_skipped_with_a_warning() {
    let log = log_file(&[
        r#"3.3.3.3 - - [09/Jul/2020 +0000] "GET /assets/a.js HTTP/1.1" 200 1 "-" "-""#,
        USER_1,
    ]);
    let (stdout, stderr, code) = run(&[log.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "Found 1 users who accessed the site\n");
    assert!(stderr.contains("skipping line"));
}

#[test]
fn log_without_visitors_is_an_error() {
    let log = log_file(&[
        r#"1.1.1.1 - - [09/Jul/2020:10:00:00 +0000] "GET /about HTTP/1.1" 301 0 "-" "-""#,
    ]);
    let (stdout, stderr, code) = run(&[log.path().to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("invalid log fields"));
}

#[test]
fn missing_file_is_an_error() {
    let (_, stderr, code) = run(&["/no/such/dir/access.log"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("couldn't open file"));
}

#[test]
fn invalid_arguments_are_rejected() {
    let (_, stderr, code) = run(&["access.txt"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("not a .log file"));

    let (_, stderr, code) = run(&["-day", "9/7/2020", "access.log"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("insert a valid date <dd/mm/yyyy>"));
}

#[test]
fn help_lists_the_filters() {
    let (stdout, _, code) = run(&["-h"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("--day <DD/MM/YYYY>"));
    assert!(stdout.contains("--month <MM/YYYY>"));
    assert!(stdout.contains("--year <YYYY>"));
}
