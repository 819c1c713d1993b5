use log::{debug, info, warn};

use vote_similarity::*;

use snafu::{prelude::*, OptionExt, ResultExt, Snafu};

use serde_json::Value as JSValue;
use std::fs;
use std::path::Path;
use text_diff::print_diff;

use crate::args::Args;

pub mod config_reader;
mod display;
mod io_common;
mod io_scorecard;
mod io_tmmis;
mod io_vacancies;
mod summary;

use crate::council::config_reader::*;
use crate::council::display::*;
use crate::council::io_common::*;
use crate::council::io_scorecard::*;
use crate::council::io_tmmis::*;
use crate::council::io_vacancies::*;
use crate::council::summary::*;

#[derive(Debug, Snafu)]
pub enum CouncilError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No worksheet found in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Unexpected cell at line {lineno}: {content}"))]
    ExcelWrongCellType { lineno: u64, content: String },
    #[snafu(display("Missing column {column}"))]
    MissingColumn { column: String },
    #[snafu(display("Term {term} of {dataset}: {source}"))]
    Term {
        source: SimilarityError,
        dataset: String,
        term: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CouncilResult<T> = Result<T, CouncilError>;

fn parse_include(values: &[String]) -> CouncilResult<IncludeFlags> {
    let mut include = IncludeFlags::default();
    for v in values.iter() {
        match v.as_str() {
            "early-departures" => include.early_departures = true,
            "temporary" => include.temporary_appointments = true,
            x => whatever!("Unknown category to include: {:?}", x),
        }
    }
    Ok(include)
}

fn read_source(root: &str, cfs: &FileSource) -> CouncilResult<RawVoteTable> {
    let p = source_path(root, &cfs.file_path);
    info!("read_source: reading {:?} with provider {}", p, cfs.provider);
    match cfs.provider.as_str() {
        "tmmis" => Ok(RawVoteTable::Records(read_tmmis_file(&p, cfs)?)),
        "scorecard_csv" => read_scorecard_csv_file(&p, cfs),
        "scorecard_xlsx" => read_scorecard_xlsx(&p, cfs),
        x => whatever!("Provider not implemented {:?}", x),
    }
}

fn ingest_term(
    root: &str,
    dataset: &DatasetConfig,
    term: &TermConfig,
    vacancies: &TermVacancies,
    cache: &mut SimilarityCache,
) -> CouncilResult<TermSummary> {
    let mut tables: Vec<RawVoteTable> = Vec::new();
    for cfs in term.sources.iter() {
        tables.push(read_source(root, cfs)?);
    }
    let votes = normalize(&tables, &to_vacancy_metadata(vacancies), &term.rules()).context(
        TermSnafu {
            dataset: dataset.name.as_str(),
            term: term.term.as_str(),
        },
    )?;
    for anchor in term.anchors.iter() {
        if votes.positions(anchor).is_none() {
            warn!(
                "ingest_term: anchor {:?} has no votes in {} {}",
                anchor, dataset.name, term.term
            );
        }
    }
    let matrix = cache
        .get_or_compute(&dataset.name, &term.term, &votes)
        .sorted_by_anchors(&term.anchors);
    debug!("ingest_term: order: {:?}", matrix.councillors());
    Ok(TermSummary::new(
        &dataset.name,
        &term.term,
        &votes.fingerprint(),
        &term.anchors,
        vacancies,
        &matrix,
    ))
}

/// Ingests all the terms of a configuration. A term that fails is recorded in
/// the failures of the summary and does not stop the other terms.
pub fn run_config(config_path: &str, cache: &mut SimilarityCache) -> CouncilResult<Summary> {
    let config = read_config(config_path)?;
    let root = config_root(config_path)?;
    let mut res = Summary::default();
    for dataset in config.datasets.iter() {
        for term in dataset.terms.iter() {
            info!("run_config: processing {} {}", dataset.name, term.term);
            let vacancies = config.term_vacancies(&term.term);
            match ingest_term(&root, dataset, term, &vacancies, cache) {
                Ok(s) => res.results.push(s),
                Err(e) => {
                    warn!(
                        "run_config: skipping {} {}: {}",
                        dataset.name, term.term, e
                    );
                    res.failures.push(TermFailure {
                        dataset: dataset.name.clone(),
                        term: term.term.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }
    Ok(res)
}

fn write_output(out: &str, contents: &str) -> CouncilResult<()> {
    if out == "stdout" {
        println!("{}", contents);
        Ok(())
    } else {
        info!("write_output: writing {:?}", out);
        fs::write(out, contents).context(WritingOutputSnafu { path: out })
    }
}

fn display_term(summary: &Summary, args: &Args, include: IncludeFlags) -> CouncilResult<String> {
    let dataset = match args
        .dataset
        .clone()
        .or_else(|| summary.results.first().map(|r| r.dataset.clone()))
    {
        Some(d) => d,
        None => whatever!("No similarities to display"),
    };
    // The most recent term by default.
    let term = match args.term.clone().or_else(|| {
        summary
            .results
            .iter()
            .filter(|r| r.dataset == dataset)
            .last()
            .map(|r| r.term.clone())
    }) {
        Some(t) => t,
        None => whatever!("No similarities to display for {}", dataset),
    };
    let entry = match summary.find(&dataset, &term) {
        Some(e) => e,
        None => whatever!("No similarities for term {} of {}", term, dataset),
    };
    let matrix = entry.matrix().context(TermSnafu {
        dataset: dataset.as_str(),
        term: term.as_str(),
    })?;
    let request = LayoutRequest {
        reference: args.sort_by.clone(),
        include,
        anchors: entry.anchors.clone(),
    };
    let l = layout(&matrix, &to_vacancy_metadata(&entry.vacancies), &request);
    debug!("display_term: candidates: {:?}", l.candidates);
    Ok(format_layout(&l))
}

fn check_reference(reference_path: &str, computed: &str) -> CouncilResult<()> {
    let reference = normalized_json(reference_path)?;
    if reference != computed {
        warn!("Found differences with the reference");
        print_diff(reference.as_str(), computed, "\n");
        whatever!("Difference detected between the computed similarities and the reference")
    }
    info!("check_reference: identical to {:?}", reference_path);
    Ok(())
}

pub fn run(args: &Args) -> CouncilResult<()> {
    let include = parse_include(&args.include)?;
    let previous: Option<Summary> = match args.input.as_deref() {
        Some(p) => Some(read_summary(p)?),
        None => None,
    };

    let summary = match args.config.as_deref() {
        Some(config_path) => {
            let mut cache = SimilarityCache::new();
            if let Some(prev) = previous.as_ref() {
                prev.seed_cache(&mut cache);
                info!("run: {} terms read from the previous run", cache.len());
            }
            run_config(config_path, &mut cache)?
        }
        None => match previous {
            Some(prev) => prev,
            None => whatever!("Either --config or --input must be provided"),
        },
    };

    let computed = summary_to_string(&summary)?;
    if let Some(out) = args.out.as_deref() {
        write_output(out, &computed)?;
    }

    if args.dataset.is_some() || args.term.is_some() || args.sort_by.is_some() {
        print!("{}", display_term(&summary, args, include)?);
    }

    if let Some(reference_path) = args.reference.as_deref() {
        check_reference(reference_path, &computed)?;
    }

    if !summary.failures.is_empty() {
        whatever!("{} terms could not be processed", summary.failures.len())
    }
    Ok(())
}
