use std::path::PathBuf;
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "marketsynth-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn marketsynth() -> Command {
    Command::new(env!("CARGO_BIN_EXE_marketsynth"))
}

#[test]
fn cli_writes_entries_for_selected_ids() {
    let output_path = temp_path("entries");
    let status = marketsynth()
        .args(["--only", "wv-oak-hill,nc-sylva", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.starts_with("// STATE: NC (1 new cities)\n    { id: 'nc-sylva'"));
    assert!(content.contains("// STATE: WV (1 new cities)\n    { id: 'wv-oak-hill', name: 'Oak Hill'"));
}

#[test]
fn cli_output_is_deterministic() {
    let run = || {
        marketsynth()
            .args(["--only", "fl-micanopy,az-page"])
            .output()
            .expect("run cli")
            .stdout
    };
    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}

#[test]
fn cli_inserts_into_corpus_and_skips_on_rerun() {
    let corpus_path = temp_path("corpus.ts");
    std::fs::write(
        &corpus_path,
        "export const cityData: Record<string, CityData[]> = {\n  WV: [\n  ],\n};\n",
    )
    .expect("write corpus");

    let report_path = temp_path("insert.json");
    let status = marketsynth()
        .args(["--only", "wv-oak-hill,nc-sylva", "--insert", "--report", "json", "--corpus"])
        .arg(&corpus_path)
        .arg("--output")
        .arg(&report_path)
        .status()
        .expect("run cli");
    assert!(status.success());

    let corpus = std::fs::read_to_string(&corpus_path).expect("read corpus");
    assert!(corpus.contains("  NC: [\n    { id: 'nc-sylva'"));
    assert!(corpus.contains("  WV: [\n    { id: 'wv-oak-hill'"));
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read report"))
            .expect("parse report");
    assert_eq!(report["commit"]["insert"]["inserted"], 2);
    assert_eq!(report["commit"]["saved"], true);

    let rerun = marketsynth()
        .args(["--only", "wv-oak-hill,nc-sylva", "--report", "json", "--corpus"])
        .arg(&corpus_path)
        .output()
        .expect("run cli");
    assert!(rerun.status.success());
    let report: serde_json::Value = serde_json::from_slice(&rerun.stdout).expect("parse report");
    assert_eq!(report["synthesized"], 0);
    assert_eq!(report["skipped"].as_array().map(Vec::len), Some(2));
    assert_eq!(std::fs::read_to_string(&corpus_path).expect("reread corpus"), corpus);
}

#[test]
fn cli_exits_with_failure_on_rejected_descriptors() {
    let descriptors_path = temp_path("descriptors.json");
    std::fs::write(
        &descriptors_path,
        r#"[
  {"id": "wv-thurmond", "name": "Thurmond", "state": "WV", "population": 5, "market_type": "mountain"},
  {"id": "wv-nameless", "name": " ", "state": "WV", "population": 5, "market_type": "rural"}
]"#,
    )
    .expect("write descriptors");

    let output = marketsynth()
        .arg("--descriptors")
        .arg(&descriptors_path)
        .output()
        .expect("run cli");
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("{ id: 'wv-thurmond'"));
    assert!(stderr.contains("wv-nameless"));
}

#[test]
fn cli_rejects_insert_without_corpus() {
    let output = marketsynth().arg("--insert").output().expect("run cli");
    assert!(!output.status.success());
}

#[test]
fn cli_refuses_to_write_the_report_over_the_corpus() {
    let corpus_path = temp_path("shared.ts");
    let original = "export const cityData: Record<string, CityData[]> = {\n  WV: [\n  ],\n};\n";
    std::fs::write(&corpus_path, original).expect("write corpus");

    let output = marketsynth()
        .args(["--only", "wv-oak-hill", "--insert", "--corpus"])
        .arg(&corpus_path)
        .arg("--output")
        .arg(&corpus_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("is the corpus file"));
    assert_eq!(std::fs::read_to_string(&corpus_path).expect("reread corpus"), original);
}
