// Entry point and high-level CLI flow.
//
// - Option [1] loads a sheet from the workbook and prints diagnostics.
// - Option [2] changes tax type and fiscal year; metrics are recomputed.
// - Option [3] picks the unit/status/classification filters.
// - Option [4] prints the reports and exports them.
// After generating reports, the user can go back to the menu or exit.
use clap::Parser;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tax_compliance::filter::{self, FilterOptions, FilterSelection};
use tax_compliance::pipeline::{assess, Assessment, AssessmentConfig, TaxType, DEFAULT_FISCAL_YEAR};
use tax_compliance::types::{AssessedRow, Dataset};
use tax_compliance::{loader, output, reports, util};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Tax compliance dashboard for monthly payment workbooks.
#[derive(Parser, Debug)]
#[command(name = "tax-compliance", version, about, long_about = None)]
struct Cli {
    /// Workbook (.xlsx, .xls, .ods) or CSV file with monthly payments.
    input: Option<PathBuf>,

    /// Sheet to load; defaults to asking, or the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// Tax type: "makan minum" / "food & beverage" or "hiburan" / "entertainment".
    #[arg(long, default_value = "makan minum", value_parser = parse_tax_type)]
    tax_type: TaxType,

    /// Fiscal year to evaluate (2000-2100).
    #[arg(long, default_value_t = DEFAULT_FISCAL_YEAR)]
    fiscal_year: i32,

    /// Directory for exported CSV/JSON reports.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_tax_type(s: &str) -> Result<TaxType, String> {
    s.parse::<TaxType>().map_err(|e| e.to_string())
}

// In-memory session state: one loaded sheet, the current configuration and
// the assessment computed from them.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    input: Option<PathBuf>,
    sheet: Option<String>,
    output_dir: PathBuf,
    config: AssessmentConfig,
    dataset: Option<Dataset>,
    assessment: Option<Assessment>,
    selection: FilterSelection,
}

impl AppState {
    /// Recompute metrics after a load or a configuration change.
    fn reassess(&mut self) {
        self.assessment = self.dataset.as_ref().map(|d| assess(d, &self.config));
        self.selection = FilterSelection::default();
    }
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask the user whether to go back to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Menu (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Pick a subset of `options` by 1-based indices ("1,3"); blank keeps all.
fn prompt_multi_select(label: &str, options: &[String]) -> Option<Vec<String>> {
    if options.is_empty() {
        return None;
    }
    println!("{}:", label);
    for (i, o) in options.iter().enumerate() {
        println!("  [{}] {}", i + 1, o);
    }
    let answer = read_line("Numbers separated by commas (blank = all): ");
    if answer.is_empty() {
        return None;
    }
    let picked: Vec<String> = answer
        .split(',')
        .filter_map(|s| s.trim().parse::<usize>().ok())
        .filter_map(|i| i.checked_sub(1).and_then(|i| options.get(i)).cloned())
        .collect();
    Some(picked)
}

fn choose_sheet(path: &Path, preset: Option<String>) -> Option<String> {
    if preset.is_some() {
        return preset;
    }
    let names = match loader::sheet_names(path) {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "could not list sheets");
            return None;
        }
    };
    if names.len() <= 1 {
        return names.into_iter().next();
    }
    println!("Sheets:");
    for (i, n) in names.iter().enumerate() {
        println!("  [{}] {}", i + 1, n);
    }
    let answer = read_line("Select sheet (blank = first): ");
    answer
        .parse::<usize>()
        .ok()
        .and_then(|i| i.checked_sub(1))
        .and_then(|i| names.get(i).cloned())
        .or_else(|| names.into_iter().next())
}

/// Handle option [1]: load one sheet and assess it.
fn handle_load() {
    let (input, preset_sheet) = {
        let st = state();
        (st.input.clone(), st.sheet.clone())
    };
    let path = match input {
        Some(p) => p,
        None => PathBuf::from(read_line("Workbook path: ")),
    };
    let sheet = choose_sheet(&path, preset_sheet);
    match loader::load_sheet(&path, sheet.as_deref()) {
        Ok((dataset, load_report)) => {
            println!(
                "Processing sheet {}... ({} rows loaded, {} columns)",
                dataset.sheet,
                util::format_int(load_report.loaded_rows),
                util::format_int(load_report.columns)
            );
            if load_report.skipped_empty > 0 {
                println!(
                    "Note: {} empty rows skipped.",
                    util::format_int(load_report.skipped_empty)
                );
            }
            let mut st = state();
            st.input = Some(path);
            st.sheet = Some(dataset.sheet.clone());
            st.dataset = Some(dataset);
            st.reassess();
            if let Some(a) = &st.assessment {
                println!(
                    "Detected {} month columns: {}\n",
                    a.month_columns.len(),
                    a.month_columns
                        .iter()
                        .map(|m| m.header.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: tax type and fiscal year.
fn handle_configure() {
    let current = state().config;
    println!("Tax type: [1] MAKAN MINUM  [2] HIBURAN (current: {})", current.tax_type.local_label());
    let tax_type = match read_choice().as_str() {
        "1" => TaxType::FoodBeverage,
        "2" => TaxType::Entertainment,
        _ => current.tax_type,
    };
    let year_answer = read_line(&format!("Fiscal year (current: {}): ", current.fiscal_year));
    let fiscal_year = if year_answer.is_empty() {
        current.fiscal_year
    } else {
        match year_answer.parse::<i32>() {
            Ok(y) => y,
            Err(_) => {
                println!("Invalid year.\n");
                return;
            }
        }
    };
    match AssessmentConfig::new(tax_type, fiscal_year) {
        Ok(config) => {
            let mut st = state();
            st.config = config;
            st.reassess();
            println!("Configured: {} {}\n", config.tax_type.local_label(), config.fiscal_year);
        }
        Err(e) => println!("{}\n", e),
    }
}

/// Handle option [3]: filters over the assessed rows.
fn handle_filters() {
    let Some(assessment) = state().assessment.clone() else {
        println!("Error: No data loaded. Please load a workbook first (option 1).\n");
        return;
    };
    let options = FilterOptions::from_assessment(&assessment);
    let selection = FilterSelection {
        units: prompt_multi_select("Units", &options.units),
        statuses: prompt_multi_select("Status", &options.statuses),
        classifications: prompt_multi_select("Classification", &options.classifications),
    };
    let selected = filter::apply(&assessment, &options, &selection).len();
    println!("{} of {} units selected.\n", selected, assessment.rows.len());
    state().selection = selection;
}

/// Handle option [4]: print and export every report.
///
/// Side effects: writes three CSV files and one JSON summary into the
/// output directory, and prints Markdown previews to the console.
fn handle_generate_reports() {
    let (assessment, selection, output_dir) = {
        let st = state();
        (st.assessment.clone(), st.selection.clone(), st.output_dir.clone())
    };
    let Some(assessment) = assessment else {
        println!("Error: No data loaded. Please load a workbook first (option 1).\n");
        return;
    };
    let options = FilterOptions::from_assessment(&assessment);
    let rows: Vec<&AssessedRow> = filter::apply(&assessment, &options, &selection);
    let note = format!(
        "{} {}, {} units",
        assessment.config.tax_type.local_label(),
        assessment.config.fiscal_year,
        rows.len()
    );

    println!("Generating reports...\n");

    let histogram = reports::tier_histogram(&rows);
    output::preview_table("Compliance Tiers", Some(&note), &histogram, histogram.len());

    let monthly = reports::monthly_totals(&assessment, &rows);
    output::preview_table("Monthly Payment Totals", None, &monthly, monthly.len());
    export(&output_dir.join("compliance_monthly.csv"), &monthly);

    let top = reports::top_payer_table(&rows);
    output::preview_table("Top 5 Units by Total Payment", None, &top, reports::TOP_PAYERS);
    export(&output_dir.join("compliance_top5.csv"), &top);

    let summary = reports::summary_table(&rows);
    output::preview_table("Compliance Summary", Some("first 10 rows"), &summary, 10);
    let summary_path = output_dir.join("compliance_summary.csv");
    export(&summary_path, &summary);
    println!("(Full table exported to {})\n", summary_path.display());

    let overview = reports::overview(&assessment, &rows);
    let overview_path = output_dir.join("compliance_overview.json");
    if let Err(e) = output::write_json(&overview_path, &overview) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats ({}):", overview_path.display());
    println!(
        "{{\"total_payment\": {}, \"avg_compliance_pct\": {}}}\n",
        util::format_number(overview.total_payment, 2),
        util::format_number(overview.avg_compliance_pct, 2)
    );
}

fn export<T: serde::Serialize>(path: &Path, rows: &[T]) {
    if let Err(e) = output::write_csv(path, rows) {
        eprintln!("Write error: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match AssessmentConfig::new(cli.tax_type, cli.fiscal_year) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    debug!(?config, "starting");
    {
        let mut st = state();
        st.input = cli.input.clone();
        st.sheet = cli.sheet.clone();
        st.output_dir = cli.output_dir.clone();
        st.config = config;
    }
    if cli.input.is_some() {
        handle_load();
    }

    loop {
        println!("Tax Compliance Dashboard:");
        println!("[1] Load the workbook");
        println!("[2] Configure tax type and fiscal year");
        println!("[3] Choose filters");
        println!("[4] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                state().input = None;
                state().sheet = None;
                handle_load();
            }
            "2" => handle_configure(),
            "3" => handle_filters(),
            "4" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2, 3 or 4.\n");
            }
        }
    }
}
