use std::process::Command;

/// Reference clock for every fixture: 2023-11-14T22:13:20Z.
const NOW: &str = "1700000000";

fn run(args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(env!("CARGO_BIN_EXE_lead-lifecycle"))
        .args(args)
        .env("RUST_LOG", "warn")
        .env("LEAD_LIFECYCLE_NOW", NOW)
        .output()
        .expect("failed to run binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.code())
}

#[test]
fn manager_menus() {
    let (stdout, stderr, code) = run(&["menus", "manager", "tests/fixtures/leads.csv"]);

    assert_eq!(code, Some(0));
    assert!(stderr.contains("unrecognized lead status 'archived'"));
    assert!(stderr.contains("disbursement record does not match lead status"));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "lead,actions",
            "L1,View|Edit|Duplicate|Status|Timeline",
            "L2,View|Duplicate|Status|Timeline",
            "L3,View|Duplicate|Timeline|Disbursement",
            "L4,View|Duplicate|Timeline",
            "L5,View|Duplicate|Timeline",
        ]
    );
}

#[test]
fn admin_menus() {
    let (stdout, _, code) = run(&["menus", "admin", "tests/fixtures/leads.csv"]);

    assert_eq!(code, Some(0));
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines[4],
        "L4,View|Edit|Duplicate|Assign|Status|Timeline|Edit Disbursement|Delete"
    );
    assert_eq!(lines[5], "L5,View|Edit|Duplicate|Assign|Timeline|Delete");
}

#[test]
fn partner_menus() {
    let (stdout, stderr, code) = run(&["menus", "partner", "tests/fixtures/originator_leads.csv"]);

    assert_eq!(code, Some(0));
    assert!(stderr.is_empty());
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "lead,actions",
            "N1,View|Edit|Timeline|Delete",
            "N2,View|Timeline",
            "N3,View|Timeline",
        ]
    );
}

#[test]
fn transitions_report_each_outcome() {
    let (stdout, stderr, code) = run(&["transitions", "tests/fixtures/requests.csv"]);

    assert_eq!(code, Some(0));
    assert!(stderr.contains("unrecognized lead status 'bogus'"));

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        vec![
            "lead,from,to,outcome",
            "R1,login,approved,ok",
            "R2,login,rejected,rejectReason is required",
            "R3,closed,login,cannot move a lead from closed to login",
            "R4,pending,pending,lead is already pending",
            "R5,approved,disbursed,comment is required",
            "R6,login,approved,approved amount: 'abc' is not a valid amount",
            "R7,expired,login,ok",
        ]
    );
}

#[test]
fn unknown_role_prints_usage() {
    let (stdout, stderr, code) = run(&["menus", "owner", "tests/fixtures/leads.csv"]);

    assert_eq!(code, Some(2));
    assert!(stdout.is_empty());
    assert!(stderr.contains("unrecognized role 'owner'"));
    assert!(stderr.contains("usage"));
}

#[test]
fn missing_file_fails() {
    let (stdout, stderr, code) = run(&["transitions", "tests/fixtures/missing.csv"]);

    assert_eq!(code, Some(1));
    assert!(stdout.is_empty());
    assert!(stderr.contains("failed to open csv file"));
}
