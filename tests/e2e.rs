// End-to-end tests for donation-analytics
//
// These tests drive the full pipeline from an itcont file on disk to the
// repeat-donor output file.

use anyhow::Result;
use donation_analytics::{run_with_config, RunSummary};
use donation_analytics_config::RuntimeConfig;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE_ITCONT: &str = "\
C00629618|N|TER|P|201701230300133512|15C|IND|PEREZ, JOHN A|LOS ANGELES|CA|90017|PRINCIPAL|DOUBLE NICKEL ADVISORS|01032017|40|H6CA34245|SA01251735122|1141239|||2012520171368850783
C00177436|N|M2|P|201702039042410894|15|IND|DEEHAN, WILLIAM N|ALPHARETTA|GA|300047357|UNUM|SVP, SALES, CL|01312017|384||PR2283873845050|1147350||P/R DEDUCTION ($192.00 BI-WEEKLY)|4020820171370029337
C00384818|N|M2|P|201702039042412112|15|IND|ABBOTT, JOSEPH|WOONSOCKET|RI|028956146|CVS HEALTH|EVP, HEAD OF RETAIL OPERATIONS|01122017|250||2017020211435-887|1147467|||4020820171370030285
C00177436|N|M2|P|201702039042410893|15|IND|SABOURIN, JAMES|LOLO|MT|598647253|UNUM|SVP, CORPORATE COMMUNICATIONS|01312017|230||PR1890575345050|1147350||P/R DEDUCTION ($115.00 BI-WEEKLY)|4020820171370029335
C00177436|N|M2|P|201702039042410895|15|IND|JEROME, CHRISTOPHER|LOLO|MT|598647253|UNUM|EVP, GLOBAL SERVICES|10312017|384||PR2283905245050|1147350||P/R DEDUCTION ($192.00 BI-WEEKLY)|4020820171370029342
C00384516|N|M2|P|201702039042410894|15|IND|ABBOTT, JOSEPH|WOONSOCKET|RI|028956146|CVS HEALTH|EVP, HEAD OF RETAIL OPERATIONS|01122018|333||2017020211435-910|1147467|||4020820171370030287
C00384516|N|M2|P|201702039042410894|15|IND|SABOURIN, JAMES|LOLO|MT|598647253|UNUM|SVP, CORPORATE COMMUNICATIONS|01312018|384||PR2283873845050|1147350||P/R DEDUCTION ($192.00 BI-WEEKLY)|4020820171370029337
";

fn record(cmte: &str, name: &str, zip: &str, date: &str, amount: &str) -> String {
    format!(
        "{}|N|M2|P|201702039042410894|15|IND|{}|CITY|ST|{}|EMPLOYER|OCCUPATION|{}|{}||PR0000000000000|1147350|||4020820171370029337\n",
        cmte, name, zip, date, amount
    )
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(itcont: &str, percentile: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        fs::create_dir_all(dir.path().join("input"))?;
        fs::write(dir.path().join("input/itcont.txt"), itcont)?;
        fs::write(dir.path().join("input/percentile.txt"), percentile)?;
        Ok(Self { dir })
    }

    fn path(&self, relative: &str) -> String {
        self.dir.path().join(relative).display().to_string()
    }

    fn config(&self) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.input.contributions = self.path("input/itcont.txt");
        config.input.percentile_file = self.path("input/percentile.txt");
        config.output.path = self.path("output/repeat_donors.txt");
        config
    }

    fn run(&self) -> Result<(Vec<String>, RunSummary)> {
        let config = self.config();
        let summary = run_with_config(&config)?;
        let output = fs::read_to_string(&config.output.path)?;
        Ok((output.lines().map(str::to_string).collect(), summary))
    }
}

#[test]
fn test_sample_itcont_produces_expected_rows() -> Result<()> {
    let workspace = Workspace::new(SAMPLE_ITCONT, "30\n")?;
    let (rows, summary) = workspace.run()?;

    assert_eq!(
        rows,
        vec![
            "C00384516|02895|2018|333|333|1",
            "C00384516|59864|2018|384|384|1",
        ]
    );
    assert_eq!(summary.lines_read, 7);
    assert_eq!(summary.rejected.non_individual, 1);
    assert_eq!(summary.records_accepted, 6);
    assert_eq!(summary.repeat_records, 2);
    assert_eq!(summary.non_repeat_records, 4);
    assert_eq!(summary.distinct_donors, 4);
    assert_eq!(summary.cohorts, 2);
    Ok(())
}

#[test]
fn test_repeat_donor_scenario_across_donors() -> Result<()> {
    let input = [
        record("X", "ALPHA, ANN", "90210", "03012017", "100"),
        record("X", "ALPHA, ANN", "90210", "03012018", "250"),
        record("X", "BRAVO, BEN", "90210", "04012018", "75"),
        record("X", "ALPHA, ANN", "90210", "05012018", "50"),
    ]
    .concat();
    let workspace = Workspace::new(&input, "30")?;
    let (rows, summary) = workspace.run()?;

    assert_eq!(rows, vec!["X|90210|2018|250|250|1", "X|90210|2018|50|300|2"]);
    assert_eq!(summary.rows_emitted(), 2);
    Ok(())
}

#[test]
fn test_running_percentile_sequence() -> Result<()> {
    let mut input = record("C00000001", "DOE, SAM", "10001", "01012016", "1");
    for (i, amount) in ["10", "20", "30", "40", "50"].iter().enumerate() {
        let name = format!("DONOR, NUMBER{}", i);
        input.push_str(&record("C00000002", &name, "10001", "06012016", "5"));
        input.push_str(&record("C00000001", &name, "10001", "06012017", amount));
    }
    let workspace = Workspace::new(&input, "30")?;
    let (rows, _) = workspace.run()?;

    assert_eq!(
        rows,
        vec![
            "C00000001|10001|2017|10|10|1",
            "C00000001|10001|2017|10|30|2",
            "C00000001|10001|2017|10|60|3",
            "C00000001|10001|2017|20|100|4",
            "C00000001|10001|2017|20|150|5",
        ]
    );
    Ok(())
}

#[test]
fn test_out_of_order_years_and_cents() -> Result<()> {
    let input = [
        record("C1", "CHARLIE, CY", "60614", "07042018", "10.10"),
        record("C1", "CHARLIE, CY", "60614", "07042015", "20.20"),
        record("C1", "CHARLIE, CY", "60614", "07042019", "30.50"),
        record("C1", "CHARLIE, CY", "60614", "08042019", "0.25"),
    ]
    .concat();
    let workspace = Workspace::new(&input, "100")?;
    let (rows, _) = workspace.run()?;

    assert_eq!(
        rows,
        vec!["C1|60614|2019|31|30.50|1", "C1|60614|2019|31|30.75|2"]
    );
    Ok(())
}

#[test]
fn test_summary_json_written() -> Result<()> {
    let workspace = Workspace::new(SAMPLE_ITCONT, "30")?;
    let mut config = workspace.config();
    let summary_path = workspace.path("output/summary.json");
    config.output.summary = Some(summary_path.clone());

    run_with_config(&config)?;

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&summary_path)?)?;
    assert_eq!(summary["repeat_records"], 2);
    assert_eq!(summary["rejected"]["non_individual"], 1);
    assert_eq!(summary["percentile"], 30.0);
    Ok(())
}

#[test]
fn test_invalid_percentile_aborts_before_output() -> Result<()> {
    for bad in ["0", "101", "abc", ""] {
        let workspace = Workspace::new(SAMPLE_ITCONT, bad)?;
        let config = workspace.config();

        let err = run_with_config(&config).unwrap_err();
        assert!(
            format!("{:#}", err).contains("percentile"),
            "unexpected error for {:?}: {:#}",
            bad,
            err
        );
        assert!(!Path::new(&config.output.path).exists());
    }
    Ok(())
}

#[test]
fn test_missing_input_is_error() -> Result<()> {
    let workspace = Workspace::new("", "30")?;
    let mut config = workspace.config();
    config.input.contributions = workspace.path("input/missing.txt");

    let err = run_with_config(&config).unwrap_err();
    assert!(err.to_string().contains("Failed to open input file"));
    Ok(())
}

#[test]
fn test_empty_input_writes_empty_output() -> Result<()> {
    let workspace = Workspace::new("", "30")?;
    let (rows, summary) = workspace.run()?;
    assert!(rows.is_empty());
    assert_eq!(summary.lines_read, 0);
    Ok(())
}
