// Reader for the list of the councillors who did not serve a full term.
//
// The first column is the term, the other columns list names separated by
// semicolons:
//
// Term,Early Departures,Temporary Councillors
// 2018-2022,Jim Karygiannis;Gary Crawford,Suzan Hall

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;

use crate::council::*;

const NAME_SEPARATOR: char = ';';

fn column_reason(header: &str) -> Option<VacancyReasonConfig> {
    match header.trim() {
        "Early Departures" => Some(VacancyReasonConfig::EarlyDeparture),
        "Temporary Councillors" => Some(VacancyReasonConfig::TemporaryAppointment),
        _ => None,
    }
}

pub fn read_vacancies_file(path: &str) -> CouncilResult<BTreeMap<String, TermVacancies>> {
    let file = File::open(path).context(OpeningCsvSnafu { path })?;
    read_vacancies(file)
}

pub fn read_vacancies<R: Read>(input: R) -> CouncilResult<BTreeMap<String, TermVacancies>> {
    read_records(csv::ReaderBuilder::new().has_headers(true).from_reader(input))
}

fn read_records<R: Read>(
    mut rdr: csv::Reader<R>,
) -> CouncilResult<BTreeMap<String, TermVacancies>> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut columns: Vec<(usize, VacancyReasonConfig)> = Vec::new();
    for (idx, h) in header.iter().enumerate().skip(1) {
        match column_reason(h) {
            Some(reason) => columns.push((idx, reason)),
            None => warn!("read_vacancies: ignoring column {:?}", h),
        }
    }

    let mut res: BTreeMap<String, TermVacancies> = BTreeMap::new();
    for (idx, line_r) in rdr.records().enumerate() {
        let line = line_r.context(CsvLineParseSnafu { lineno: idx + 2 })?;
        let term = line.get(0).unwrap_or("").trim().to_string();
        if term.is_empty() {
            continue;
        }
        let entries = res.entry(term).or_default();
        for (col, reason) in columns.iter() {
            let names = line.get(*col).unwrap_or("");
            for name in names.split(NAME_SEPARATOR).map(|s| s.trim()).filter(|s| !s.is_empty()) {
                entries.insert(
                    name.to_string(),
                    VacancyConfig {
                        reason: *reason,
                        replacements: Vec::new(),
                    },
                );
            }
        }
    }
    debug!("read_vacancies: {:?}", res);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_terms() {
        let data = "Term,Early Departures,Temporary Councillors\n\
                    2010-2014,,Peter Leon\n\
                    2018-2022,Jim Karygiannis; Gary Crawford,\n";
        let res = read_vacancies(data.as_bytes()).unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(
            res["2010-2014"]["Peter Leon"].reason,
            VacancyReasonConfig::TemporaryAppointment
        );
        let names: Vec<&String> = res["2018-2022"].keys().collect();
        assert_eq!(names, vec!["Gary Crawford", "Jim Karygiannis"]);
    }
}
