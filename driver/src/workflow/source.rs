use anyhow::{bail, Context};
use calamine::{open_workbook_auto, Data, Range, Reader};
use phasorcore::scenario::workbook::SheetRows;
use phasorcore::scenario::{ScenarioSet, Workbook};
use std::fs;
use std::path::Path;

pub const WORKBOOK_LAYOUT: &str = "\
A workbook has five sheets, each keyed by name (JSON object, YAML mapping or
spreadsheet tab). One column per scenario; empty cells are null. Spreadsheet
tabs start with a header row and a label column, both of which are skipped.

  Currents        rows of line current magnitudes (A), one row per conductor
  Current Angles  rows of current angles (degrees), same shape as Currents
  UNN             one voltage magnitude N-N' per scenario, null or 0 = no displacement
  Voltages        three rows of phase voltages U1N', U2N', U3N'
  INN             one neutral current magnitude per scenario, null = 0";

const SHEETS: [&str; 5] = ["Currents", "Current Angles", "UNN", "Voltages", "INN"];

enum Format {
    Json,
    Yaml,
    Spreadsheet,
}

fn format_of(path: &Path) -> anyhow::Result<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("xlsx") | Some("xlsm") | Some("xls") | Some("ods") => Ok(Format::Spreadsheet),
        _ => bail!(
            "unsupported workbook {}: expected a .json, .yaml, .yml, .xlsx, .xlsm, .xls or .ods file",
            path.display()
        ),
    }
}

pub fn load_workbook<P: AsRef<Path>>(path: P) -> anyhow::Result<ScenarioSet> {
    let path_ref = path.as_ref();
    let workbook = match format_of(path_ref)? {
        Format::Spreadsheet => read_spreadsheet(path_ref)?,
        Format::Json => Workbook::from_json_str(&read_text(path_ref)?)
            .with_context(|| format!("parsing workbook {}", path_ref.display()))?,
        Format::Yaml => serde_yaml::from_str(&read_text(path_ref)?)
            .with_context(|| format!("parsing workbook {}", path_ref.display()))?,
    };
    let set = workbook
        .into_scenarios()
        .with_context(|| format!("reading scenarios from {}", path_ref.display()))?;
    log::info!("loaded {} scenarios from {}", set.len(), path_ref.display());
    Ok(set)
}

pub fn save_workbook<P: AsRef<Path>>(path: P, set: &ScenarioSet) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    let workbook = Workbook::from_scenarios(set.scenarios());
    let contents = match format_of(path_ref)? {
        Format::Json => workbook.to_json_string()?,
        Format::Yaml => serde_yaml::to_string(&workbook)?,
        Format::Spreadsheet => bail!(
            "cannot export {}: spreadsheets are read-only, use .json or .yaml",
            path_ref.display()
        ),
    };
    if let Some(parent) = path_ref.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    fs::write(path_ref, contents)
        .with_context(|| format!("writing workbook {}", path_ref.display()))?;
    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading workbook {}", path.display()))
}

/// Reads the five tabs of a spreadsheet. Row 0 holds scenario headers and
/// column 0 holds row labels; every tab is read as wide as the widest one.
fn read_spreadsheet(path: &Path) -> anyhow::Result<Workbook> {
    let mut file = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let ranges = SHEETS
        .iter()
        .map(|name| {
            file.worksheet_range(name)
                .with_context(|| format!("reading sheet '{}' of {}", name, path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let width = ranges
        .iter()
        .filter_map(|range| range.end())
        .map(|(_, column)| column)
        .max()
        .unwrap_or(0);
    let sheet = |index: usize| {
        sheet_rows(&ranges[index], width)
            .with_context(|| format!("sheet '{}' of {}", SHEETS[index], path.display()))
    };

    Ok(Workbook {
        currents: sheet(0)?,
        current_angles: sheet(1)?,
        unn: first_row(sheet(2)?),
        voltages: sheet(3)?,
        inn: first_row(sheet(4)?),
    })
}

fn sheet_rows(range: &Range<Data>, width: u32) -> anyhow::Result<SheetRows> {
    let Some((last_row, _)) = range.end() else {
        return Ok(Vec::new());
    };
    (1..=last_row)
        .map(|row| {
            (1..=width)
                .map(|column| cell_value(range.get_value((row, column)), row, column))
                .collect::<anyhow::Result<Vec<_>>>()
        })
        .collect()
}

fn first_row(rows: SheetRows) -> Vec<Option<f64>> {
    rows.into_iter().next().unwrap_or_default()
}

fn cell_value(cell: Option<&Data>, row: u32, column: u32) -> anyhow::Result<Option<f64>> {
    match cell {
        None | Some(Data::Empty) => Ok(None),
        Some(Data::Float(value)) => Ok(Some(*value)),
        Some(Data::Int(value)) => Ok(Some(*value as f64)),
        Some(Data::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Data::String(text)) => text.trim().parse().map(Some).with_context(|| {
            format!(
                "cell at row {} column {} is not a number: {:?}",
                row + 1,
                column + 1,
                text
            )
        }),
        Some(other) => bail!(
            "cell at row {} column {} is not a number: {:?}",
            row + 1,
            column + 1,
            other
        ),
    }
}
