mod support;

use predicates::str::contains;
use serde_json::{json, Value};

use support::{bztj_cmd, TestDir};

fn write_sample_export(dir: &TestDir) {
    let doc = json!({
        "bugs": [
            {
                "bug_id": 1,
                "summary": "META: Editor stability",
                "priority": "P1",
                "product": "Core",
                "severity": "normal",
                "keywords": "meta",
                "assigned_to": "nobody@example.com",
                "target_milestone": "1.0"
            },
            {
                "bug_id": 2,
                "summary": "Fix crash on \"save\"",
                "priority": "P2",
                "product": "Core",
                "severity": "critical",
                "keywords": "crash",
                "assigned_to": "jane.doe@example.com",
                "target_milestone": "1.0",
                "estimated_time": 8.0,
                "remaining_time": 6.5
            },
            {
                "bug_id": 3,
                "summary": "Add dark theme",
                "priority": "P5",
                "product": "UI",
                "severity": "enhancement",
                "assigned_to": "sam@example.com",
                "target_milestone": "1.0"
            },
            {
                "bug_id": 4,
                "summary": "Old defect",
                "priority": "P3",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "jane.doe@example.com",
                "target_milestone": "1.0",
                "resolved_at": "2026-02-14T09:15:00Z"
            },
            {
                "bug_id": 5,
                "summary": "Future work",
                "priority": "P4",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "sam@example.com",
                "target_milestone": "2.0"
            }
        ],
        "dependencies": [
            { "blocked": 1, "depends_on": 2 },
            { "blocked": 2, "depends_on": 3 }
        ]
    });
    dir.write_file(
        "bugs.json",
        &serde_json::to_string_pretty(&doc).expect("serialize"),
    );
}

#[test]
fn export_writes_all_documents() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .success()
        .stdout(contains("Exported 1 milestone(s)"));

    assert!(dir.exists("bugzilla_flags.tji"));
    assert!(dir.exists("bugzilla_project.tji"));
    assert!(dir.exists("1.0_resolved_tasks.tji"));
    assert!(dir.exists("1.0_open_tasks.tji"));
}

#[test]
fn open_document_nests_adopted_tasks() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .success();

    let open = dir.read_file("1.0_open_tasks.tji");
    // Group prefix stripped, blocker adopted one level down.
    assert!(open.contains("task bug_1 \"Editor stability\" {\n"));
    assert!(open.contains("  task bug_2 \"Fix crash on 'save'\" {\n"));
    // The nested task's own dependency escapes the group first.
    assert!(open.contains("    depends !!bug_3\n"));
    assert!(open.contains("    allocate janedoe\n"));
    assert!(open.contains("    effort 6.5h\n"));
    // Unprioritized enhancement without an estimate, still top-level.
    assert!(open.contains("task bug_3 \"Add dark theme\" {\n"));
    assert!(open.contains("  effort 16.0h\n"));
    assert!(open.contains("  flags flagIsEnhancement\n"));
    assert!(open.contains("  flags flagEstimateNeeded\n"));
    assert!(open.contains("  flags flagPriorityNeeded\n"));
    // Resolved bugs stay out of the open document.
    assert!(!open.contains("bug_4"));
}

#[test]
fn resolved_document_renders_fixed_milestones() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .success();

    let resolved = dir.read_file("1.0_resolved_tasks.tji");
    assert!(resolved.contains("task bug_4 \"Old defect\" {\n"));
    assert!(resolved.contains("  milestone\n"));
    assert!(resolved.contains("  flags flagIsResolved\n"));
    assert!(resolved.contains("  end 2026-02-14-09:15:00\n"));
    assert!(!resolved.contains("allocate"));
    assert!(!resolved.contains("effort"));
    assert!(!resolved.contains("bug_2"));
}

#[test]
fn auxiliary_documents_declare_flags_and_extensions() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .success();

    let flags = dir.read_file("bugzilla_flags.tji");
    let expected = "\
# Written by bztj
# Should be included at main level after the project section
flags flagIsEnhancement
flags flagIsResolved
flags flagEstimateNeeded
flags flagPriorityNeeded
";
    assert_eq!(flags, expected);

    let project = dir.read_file("bugzilla_project.tji");
    assert!(project.starts_with("# Written by bztj\n"));
    assert_eq!(project.matches("extend task {").count(), 8);
    assert!(project.contains("  text BugID \"BugID\"\n"));
    assert!(project.contains("  reference BugRef \"BugRef\"\n"));
    assert!(project.contains("  text AssignedTo \"AssignedTo\"\n"));
}

#[test]
fn json_envelope_reports_documents() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    write_sample_export(&dir);

    let output = bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "--json", "1.0", "2.0"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;

    assert_eq!(value["schema_version"].as_str(), Some("bztj.v1"));
    assert_eq!(value["command"].as_str(), Some("export"));
    assert_eq!(value["status"].as_str(), Some("success"));

    let milestones = value["data"]["milestones"].as_array().expect("milestones");
    assert_eq!(milestones.len(), 2);
    assert_eq!(milestones[0]["milestone"].as_str(), Some("1.0"));
    assert_eq!(milestones[0]["resolved_tasks"].as_u64(), Some(1));
    assert_eq!(milestones[0]["open_tasks"].as_u64(), Some(3));
    assert_eq!(milestones[1]["milestone"].as_str(), Some("2.0"));
    assert_eq!(milestones[1]["open_tasks"].as_u64(), Some(1));
    assert!(value.get("warnings").is_none());

    Ok(())
}

#[test]
fn empty_group_produces_warning() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();
    let doc = json!({
        "bugs": [
            {
                "bug_id": 7,
                "summary": "META: Lone tracker",
                "priority": "P1",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "nobody@example.com",
                "target_milestone": "1.0"
            }
        ],
        "dependencies": []
    });
    dir.write_file("bugs.json", &doc.to_string());

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .success()
        .stdout(contains(
            "META bug 7 has no open dependencies in milestone \"1.0\"",
        ));

    let output = bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "--json", "1.0"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;
    let warnings = value["warnings"].as_array().expect("warnings");
    assert_eq!(
        warnings[0].as_str(),
        Some("META bug 7 has no open dependencies in milestone \"1.0\"")
    );
    assert_eq!(value["data"]["milestones"][0]["warnings"].as_u64(), Some(1));

    Ok(())
}

#[test]
fn unknown_milestone_writes_empty_documents() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "9.9"])
        .assert()
        .success();

    assert_eq!(dir.read_file("9.9_resolved_tasks.tji"), "");
    assert_eq!(dir.read_file("9.9_open_tasks.tji"), "");
}

#[test]
fn out_dir_is_created_and_used() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args([
            "export",
            "--input",
            "bugs.json",
            "--out-dir",
            "plan/tji",
            "1.0",
        ])
        .assert()
        .success();

    assert!(dir.exists("plan/tji/bugzilla_flags.tji"));
    assert!(dir.exists("plan/tji/1.0_open_tasks.tji"));
    assert!(!dir.exists("1.0_open_tasks.tji"));
}

#[test]
fn config_in_working_directory_is_picked_up() {
    let dir = TestDir::new();
    dir.write_config(
        r#"
urlbase = "http://bugs.internal:8080"

[export]
meta_prefix = "TRACKING: "
default_effort = "4.0h"
flags_file = "flags.tji"
"#,
    );
    let doc = json!({
        "bugs": [
            {
                "bug_id": 1,
                "summary": "TRACKING: Platform work",
                "priority": "P1",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "nobody@example.com",
                "target_milestone": "1.0"
            },
            {
                "bug_id": 2,
                "summary": "Port allocator",
                "priority": "P2",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "jane@example.com",
                "target_milestone": "1.0"
            }
        ],
        "dependencies": [
            { "blocked": 1, "depends_on": 2 }
        ]
    });
    dir.write_file("bugs.json", &doc.to_string());

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .success();

    assert!(dir.exists("flags.tji"));
    assert!(!dir.exists("bugzilla_flags.tji"));
    let open = dir.read_file("1.0_open_tasks.tji");
    assert!(open.contains("task bug_1 \"Platform work\" {\n"));
    assert!(open.contains("  task bug_2 \"Port allocator\" {\n"));
    assert!(open.contains("http://bugs.internal:8080/show_bug.cgi?id=2"));
    assert!(open.contains("    effort 4.0h\n"));
}

#[test]
fn explicit_config_path_wins() {
    let dir = TestDir::new();
    dir.write_file(
        "custom.toml",
        "[export]\nunprioritized = \"P1\"\n",
    );
    let doc = json!({
        "bugs": [
            {
                "bug_id": 1,
                "summary": "Untriaged",
                "priority": "P1",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "sam@example.com",
                "target_milestone": "1.0",
                "remaining_time": 2.0
            }
        ],
        "dependencies": []
    });
    dir.write_file("bugs.json", &doc.to_string());

    bztj_cmd(&dir)
        .args([
            "export",
            "--config",
            "custom.toml",
            "--input",
            "bugs.json",
            "1.0",
        ])
        .assert()
        .success();

    let open = dir.read_file("1.0_open_tasks.tji");
    assert!(open.contains("  priority 900\n"));
    assert!(open.contains("  flags flagPriorityNeeded\n"));
}

#[test]
fn missing_input_is_a_user_error() {
    let dir = TestDir::new();

    bztj_cmd(&dir)
        .args(["export", "--input", "absent.json", "1.0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Bug export document not found"))
        .stderr(contains("hint: check the --input path"));
}

#[test]
fn malformed_input_is_a_user_error() {
    let dir = TestDir::new();
    dir.write_file("bugs.json", "{ not json");

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Malformed bug record"));
}

#[test]
fn duplicate_bug_ids_are_rejected() {
    let dir = TestDir::new();
    let doc = json!({
        "bugs": [
            {
                "bug_id": 7,
                "summary": "One",
                "priority": "P2",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "sam@example.com",
                "target_milestone": "1.0"
            },
            {
                "bug_id": 7,
                "summary": "Two",
                "priority": "P2",
                "product": "Core",
                "severity": "normal",
                "assigned_to": "sam@example.com",
                "target_milestone": "1.0"
            }
        ],
        "dependencies": []
    });
    dir.write_file("bugs.json", &doc.to_string());

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("duplicate bug id 7"));
}

#[test]
fn invalid_config_is_a_user_error() {
    let dir = TestDir::new();
    write_sample_export(&dir);
    dir.write_config("[priorities]\nP1 = 0\n");

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Invalid configuration"));
}

#[test]
fn invalid_milestone_name_is_a_user_error() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0/beta"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Invalid argument"))
        .stderr(contains("path separators"));

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", ""])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("milestone name cannot be empty"));
}

#[test]
fn unwritable_document_is_an_operation_failure() {
    let dir = TestDir::new();
    write_sample_export(&dir);
    // A directory squatting on the flags file name makes the create fail.
    std::fs::create_dir(dir.path().join("bugzilla_flags.tji")).expect("create dir");

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "1.0"])
        .assert()
        .failure()
        .code(4)
        .stderr(contains("Operation failed"))
        .stderr(contains("bugzilla_flags.tji"));
}

#[test]
fn json_error_envelope_has_code_and_kind() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TestDir::new();

    let output = bztj_cmd(&dir)
        .args(["export", "--input", "absent.json", "--json", "1.0"])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;

    assert_eq!(value["status"].as_str(), Some("error"));
    assert_eq!(value["error"]["code"].as_i64(), Some(2));
    assert_eq!(value["error"]["kind"].as_str(), Some("user_error"));
    assert_eq!(
        value["next_steps"][0].as_str(),
        Some("check the --input path")
    );

    Ok(())
}

#[test]
fn quiet_suppresses_success_output() {
    let dir = TestDir::new();
    write_sample_export(&dir);

    bztj_cmd(&dir)
        .args(["export", "--input", "bugs.json", "--quiet", "1.0"])
        .assert()
        .success()
        .stdout(predicates::str::is_empty());
}
