// Readers for the scorecards of key votes: one row per seat, one column per
// vote, in CSV or Excel format.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;

use crate::council::*;

pub fn read_scorecard_csv_file(path: &str, cfs: &FileSource) -> CouncilResult<RawVoteTable> {
    let file = File::open(path).context(OpeningCsvSnafu { path })?;
    read_scorecard_csv(file, cfs)
}

pub fn read_scorecard_csv<R: Read>(input: R, cfs: &FileSource) -> CouncilResult<RawVoteTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    assemble_scorecard(&collect_rows(rdr)?, cfs)
}

fn collect_rows<R: Read>(mut rdr: csv::Reader<R>) -> CouncilResult<Vec<Vec<String>>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let line = line_r.context(CsvLineParseSnafu { lineno: idx + 1 })?;
        rows.push(line.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

pub fn read_scorecard_xlsx(path: &str, cfs: &FileSource) -> CouncilResult<RawVoteTable> {
    let wrange = get_range(path, cfs)?;
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        let cells = row
            .iter()
            .map(|cell| read_cell(cell, (idx + 1) as u64))
            .collect::<CouncilResult<Vec<String>>>()?;
        rows.push(cells);
    }
    assemble_scorecard(&rows, cfs)
}

fn get_range(path: &str, cfs: &FileSource) -> CouncilResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, cfs.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = cfs.excel_worksheet_name.as_deref() {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        return Ok(wrange);
    }
    let all_worksheets = workbook.worksheets();
    match all_worksheets.as_slice() {
        [] => EmptyExcelSnafu { path }.fail(),
        [(worksheet_name, wrange), rest @ ..] => {
            if !rest.is_empty() {
                warn!(
                    "get_range: {} has {} worksheets, using {:?}",
                    simplify_file_name(path),
                    rest.len() + 1,
                    worksheet_name
                );
            }
            Ok(wrange.clone())
        }
    }
}

fn read_cell(cell: &DataType, lineno: u64) -> CouncilResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok("".to_string()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

/// The name of a header cell. Blank headers get a placeholder with their
/// position, so that they can still be named in the configuration.
fn column_name(header: &str, idx: usize) -> String {
    if header.trim().is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        header.trim().to_string()
    }
}

/// Builds a scorecard from raw rows, the first one being the header.
///
/// The councillor column, the configured columns and the columns without a
/// header are not votes. Data rows are numbered from 0, after the header.
pub fn assemble_scorecard(rows: &[Vec<String>], cfs: &FileSource) -> CouncilResult<RawVoteTable> {
    let header_cells = match rows.first() {
        Some(h) => h,
        None => whatever!("scorecard {} has no header row", cfs.file_path),
    };
    let header: Vec<String> = header_cells
        .iter()
        .enumerate()
        .map(|(idx, h)| column_name(h, idx))
        .collect();
    let name_idx = header_index(&header, cfs.councillor_column())?;

    let dropped_columns: HashSet<&str> = cfs
        .drop_columns
        .iter()
        .flatten()
        .map(|s| s.as_str())
        .collect();
    let vote_columns: Vec<usize> = (0..header.len())
        .filter(|idx| {
            *idx != name_idx
                && !dropped_columns.contains(header[*idx].as_str())
                && !header_cells[*idx].trim().is_empty()
        })
        .collect();
    debug!(
        "assemble_scorecard: {} vote columns out of {}",
        vote_columns.len(),
        header.len()
    );

    let dropped_rows: HashSet<usize> = cfs.drop_rows.iter().flatten().cloned().collect();
    let mut scorecard_rows: Vec<ScorecardRow> = Vec::new();
    for (idx, row) in rows.iter().skip(1).enumerate() {
        if dropped_rows.contains(&idx) {
            debug!("assemble_scorecard: dropping row {}", idx);
            continue;
        }
        let name = cfs.rename(&councillor_name(row.get(name_idx).map(|s| s.as_str()).unwrap_or("")));
        let choices: Vec<String> = vote_columns
            .iter()
            .map(|c| row.get(*c).cloned().unwrap_or_default())
            .collect();
        if name.is_empty() {
            if choices.iter().any(|c| !c.trim().is_empty()) {
                warn!("assemble_scorecard: row {} has votes but no councillor", idx);
            }
            continue;
        }
        scorecard_rows.push(ScorecardRow { name, choices });
    }
    info!(
        "assemble_scorecard: {}: {} seats, {} votes",
        simplify_file_name(&cfs.file_path),
        scorecard_rows.len(),
        vote_columns.len()
    );
    Ok(RawVoteTable::Scorecard {
        vote_ids: vote_columns.iter().map(|c| header[*c].clone()).collect(),
        rows: scorecard_rows,
    })
}
