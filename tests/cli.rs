use anyhow::Result;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_donation-analytics");

const ITCONT: &str = "\
C00177436|N|M2|P|201702039042410893|15|IND|SABOURIN, JAMES|LOLO|MT|598647253|UNUM|SVP, CORPORATE COMMUNICATIONS|01312017|230||PR1890575345050|1147350||P/R DEDUCTION ($115.00 BI-WEEKLY)|4020820171370029335
C00384516|N|M2|P|201702039042410894|15|IND|SABOURIN, JAMES|LOLO|MT|598647253|UNUM|SVP, CORPORATE COMMUNICATIONS|01312018|384||PR2283873845050|1147350||P/R DEDUCTION ($192.00 BI-WEEKLY)|4020820171370029337
";

fn command(dir: &TempDir) -> Command {
    let mut cmd = Command::new(BIN);
    cmd.current_dir(dir.path())
        .env("RUST_LOG", "error")
        .env_remove("DONATION_ANALYTICS_CONFIG")
        .env_remove("DONATION_ANALYTICS_CONFIG_CONTENT")
        .env_remove("DONATION_ANALYTICS_PERCENTILE");
    cmd
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = command(&dir)
        .arg("--help")
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("repeat donors"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--percentile"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("--log-level"));
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().unwrap();
    let output = command(&dir)
        .arg("--version")
        .output()
        .expect("Failed to run binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("donation-analytics"));
}

#[test]
fn test_cli_positional_paths() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("itcont.txt"), ITCONT)?;
    fs::write(dir.path().join("percentile.txt"), "30\n")?;

    let output = command(&dir)
        .args(["itcont.txt", "percentile.txt", "out/repeat_donors.txt"])
        .output()?;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let rows = fs::read_to_string(dir.path().join("out/repeat_donors.txt"))?;
    assert_eq!(rows, "C00384516|59864|2018|384|384|1\n");
    Ok(())
}

#[test]
fn test_cli_stdout_and_inline_percentile() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("itcont.txt"), ITCONT)?;

    let output = command(&dir)
        .args(["--input", "itcont.txt", "--percentile", "50", "--output", "-"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "C00384516|59864|2018|384|384|1\n"
    );
    Ok(())
}

#[test]
fn test_cli_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("itcont.txt"), ITCONT)?;
    fs::write(
        dir.path().join("analytics.toml"),
        r#"
[input]
contributions = "itcont.txt"
percentile = 90

[output]
path = "rows.txt"
summary = "summary.json"
"#,
    )?;

    let output = command(&dir)
        .args(["--config", "analytics.toml"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("rows.txt"))?,
        "C00384516|59864|2018|384|384|1\n"
    );
    assert!(dir.path().join("summary.json").exists());
    Ok(())
}

#[test]
fn test_cli_rejects_out_of_range_percentile() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("itcont.txt"), ITCONT)?;

    let output = command(&dir)
        .args(["--input", "itcont.txt", "--percentile", "0", "--output", "rows.txt"])
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("percentile"));
    assert!(!dir.path().join("rows.txt").exists());
    Ok(())
}

#[test]
fn test_cli_percentile_replaces_out_of_range_env_value() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("itcont.txt"), ITCONT)?;

    let output = command(&dir)
        .env("DONATION_ANALYTICS_PERCENTILE", "150")
        .args(["--input", "itcont.txt", "--percentile", "50", "--output", "-"])
        .output()?;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "C00384516|59864|2018|384|384|1\n"
    );
    Ok(())
}
