// End-to-end tests for the csvdedupe and csvlink binaries.
// Run with: cargo test -p csvdedupe-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn csvdedupe() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_csvdedupe"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn csvlink() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_csvlink"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn fx(name: &str) -> String {
    fixture(name).to_str().unwrap().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_success(output: &Output) {
    assert!(output.status.success(), "exit code: {:?}\nstderr: {}", output.status, stderr(output));
}

// ---------------------------------------------------------------------------
// csvdedupe
// ---------------------------------------------------------------------------

#[test]
fn dedupe_full_output_with_cluster_file() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("out.csv");

    let output = csvdedupe()
        .args([
            fx("people.csv").as_str(),
            "--field_names",
            "name",
            "city",
            "--clusters",
            fx("people.clusters.json").as_str(),
            "--output_file",
            out_path.to_str().unwrap(),
        ])
        .output()
        .expect("run csvdedupe");
    assert_success(&output);
    assert!(stdout(&output).is_empty(), "results go to the output file");

    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        written,
        "Cluster ID,Confidence Score,id,name,address,city\n\
         0,0.97,1,Acme Corporation,100 Main St,Chicago\n\
         1,0.88,2,Beta Industries,200 Oak Ave,Denver\n\
         0,0.95,3,ACME Corporation,100 Main St,chicago\n\
         2,1,4,\"Gamma, LLC\",300 Pine Rd,Austin\n\
         1,0.81,5,beta industries,200 Oak Ave.,Denver\n"
    );
}

#[test]
fn dedupe_destructive_writes_one_row_per_cluster() {
    let output = csvdedupe()
        .args([
            fx("people.csv").as_str(),
            "--field_names",
            "name",
            "--clusters",
            fx("people.clusters.json").as_str(),
            "--destructive",
        ])
        .output()
        .expect("run csvdedupe --destructive");
    assert_success(&output);

    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Cluster ID,id,name,address,city");
    assert!(lines[1].starts_with("0,1,"));
    assert!(lines[2].starts_with("1,2,"));
    assert!(lines[3].starts_with("2,4,"));
}

#[test]
fn dedupe_defaults_to_exact_key_clustering() {
    let output = csvdedupe()
        .args([fx("people.csv").as_str(), "--field_names", "name", "city", "-v"])
        .output()
        .expect("run csvdedupe");
    assert_success(&output);

    let ids: Vec<String> = stdout(&output)
        .lines()
        .skip(1)
        .map(|l| l.split(',').next().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["0", "1", "0", "2", "1"]);
    assert!(stderr(&output).contains("imported 5 rows"), "stderr: {}", stderr(&output));
}

#[test]
fn dedupe_reads_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = csvdedupe()
        .args(["-", "--field_names", "name"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn csvdedupe");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"name\nAcme\nacme\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert_success(&output);
    assert_eq!(stdout(&output), "Cluster ID,Confidence Score,name\n0,1,Acme\n0,1,acme\n");
}

#[test]
fn dedupe_missing_field_exits_5() {
    let output = csvdedupe()
        .args([fx("people.csv").as_str(), "--field_names", "name", "phone"])
        .output()
        .expect("run csvdedupe");
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("'phone'"), "stderr: {}", stderr(&output));
}

#[test]
fn dedupe_dangling_cluster_exits_6_without_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let clusters = dir.path().join("bad.json");
    std::fs::write(&clusters, r#"{"clusters": [{"members": [0, 42], "scores": [1, 1]}]}"#).unwrap();
    let out_path = dir.path().join("out.csv");

    let output = csvdedupe()
        .args([
            fx("people.csv").as_str(),
            "--field_names",
            "name",
            "--clusters",
            clusters.to_str().unwrap(),
            "--output_file",
            out_path.to_str().unwrap(),
        ])
        .output()
        .expect("run csvdedupe");
    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("row 42"));
    assert!(!out_path.exists(), "no partial output on failure");
}

#[test]
fn dedupe_unreadable_input_exits_3() {
    let output = csvdedupe()
        .args(["does-not-exist.csv", "--field_names", "name"])
        .output()
        .expect("run csvdedupe");
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("does-not-exist.csv"));
}

#[test]
fn dedupe_without_field_names_is_usage_error() {
    let output = csvdedupe().args([fx("people.csv").as_str()]).output().expect("run csvdedupe");
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// csvlink
// ---------------------------------------------------------------------------

#[test]
fn link_outer_join_with_match_file() {
    let output = csvlink()
        .args([
            fx("stores_a.csv").as_str(),
            fx("stores_b.csv").as_str(),
            "--field_names_1",
            "store",
            "zip",
            "--field_names_2",
            "business_name",
            "postal_code",
            "--matches",
            fx("stores.matches.json").as_str(),
        ])
        .output()
        .expect("run csvlink");
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "store,zip,business_name,postal_code,phone\n\
         Harbor Cafe,98101,Harbor Café,98101,206-555-0100\n\
         Corner Deli,60601,corner deli,60601,312-555-0199\n\
         Main Street Books,80202,,,\n\
         ,,Lakeside Grill,53703,608-555-0142\n"
    );
}

#[test]
fn link_inner_join_with_exact_key_resolver() {
    let output = csvlink()
        .args([
            fx("stores_a.csv").as_str(),
            fx("stores_b.csv").as_str(),
            "--field_names_1",
            "store",
            "zip",
            "--field_names_2",
            "business_name",
            "postal_code",
            "--inner_join",
        ])
        .output()
        .expect("run csvlink --inner_join");
    assert_success(&output);
    let body = stdout(&output);
    assert_eq!(body.lines().count(), 3, "header + 2 matches, got:\n{body}");
    assert!(body.contains("Corner Deli,60601,corner deli,60601,312-555-0199"));
    assert!(body.contains("Harbor Cafe,98101,Harbor Café,98101,206-555-0100"));
}

#[test]
fn link_from_toml_config() {
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("linked.csv");
    let cfg = dir.path().join("link.toml");
    std::fs::write(
        &cfg,
        format!(
            "input = [{:?}, {:?}]\nfield_names_1 = [\"store\", \"zip\"]\nfield_names_2 = [\"business_name\", \"postal_code\"]\noutput_file = {:?}\nmatches = {:?}\n",
            fx("stores_a.csv"),
            fx("stores_b.csv"),
            out_path.to_str().unwrap(),
            fx("stores.matches.json"),
        ),
    )
    .unwrap();

    let output = csvlink()
        .args(["--config_file", cfg.to_str().unwrap()])
        .output()
        .expect("run csvlink --config_file");
    assert_success(&output);
    let written = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(written.lines().count(), 5);
}

#[test]
fn link_requires_two_inputs() {
    let output = csvlink()
        .args([fx("stores_a.csv").as_str(), "--field_names", "store"])
        .output()
        .expect("run csvlink");
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("two input files"));
}

#[test]
fn link_missing_field_in_second_file_exits_5() {
    let output = csvlink()
        .args([fx("stores_a.csv").as_str(), fx("stores_b.csv").as_str(), "--field_names", "store"])
        .output()
        .expect("run csvlink");
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("input_2"));
}

// ---------------------------------------------------------------------------
// Resolution files of the wrong kind
// ---------------------------------------------------------------------------

#[test]
fn dedupe_rejects_pair_file_as_clusters() {
    let output = csvdedupe()
        .args([
            fx("people.csv").as_str(),
            "--field_names",
            "name",
            "--clusters",
            fx("stores.matches.json").as_str(),
        ])
        .output()
        .expect("run csvdedupe");
    assert_eq!(output.status.code(), Some(4));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("expected clusters"), "stderr: {}", stderr(&output));
}

#[test]
fn link_rejects_cluster_file_as_matches() {
    let output = csvlink()
        .args([
            fx("stores_a.csv").as_str(),
            fx("stores_b.csv").as_str(),
            "--field_names_1",
            "store",
            "--field_names_2",
            "business_name",
            "--matches",
            fx("people.clusters.json").as_str(),
        ])
        .output()
        .expect("run csvlink");
    assert_eq!(output.status.code(), Some(4));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("expected matched pairs"), "stderr: {}", stderr(&output));
}

#[test]
fn link_rejects_definition_field_outside_linked_fields() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("link.json");
    std::fs::write(
        &cfg,
        r#"{"field_names_1": ["store"], "field_names_2": ["business_name"],
            "field_definition": [{"field": "store"}, {"field": "zip"}]}"#,
    )
    .unwrap();

    let output = csvlink()
        .args([
            fx("stores_a.csv").as_str(),
            fx("stores_b.csv").as_str(),
            "--config_file",
            cfg.to_str().unwrap(),
            "--inner_join",
        ])
        .output()
        .expect("run csvlink");
    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("'zip'"), "stderr: {}", stderr(&output));
}
