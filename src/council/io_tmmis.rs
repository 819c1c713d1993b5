// Reader for the member voting records published by the City Clerk (TMMIS).

use std::fs::File;
use std::io::Read;

use crate::council::*;

struct TmmisColumns {
    first_name: usize,
    last_name: usize,
    committee: usize,
    agenda_item: usize,
    motion_type: usize,
    description: usize,
    date: usize,
    result: usize,
    vote: usize,
}

impl TmmisColumns {
    fn find(header: &[String]) -> CouncilResult<TmmisColumns> {
        Ok(TmmisColumns {
            first_name: header_index(header, "First Name")?,
            last_name: header_index(header, "Last Name")?,
            committee: header_index(header, "Committee")?,
            agenda_item: header_index(header, "Agenda Item #")?,
            motion_type: header_index(header, "Motion Type")?,
            description: header_index(header, "Vote Description")?,
            date: header_index(header, "Date/Time")?,
            result: header_index(header, "Result")?,
            vote: header_index(header, "Vote")?,
        })
    }
}

/// A result such as `Carried, 25-0`, where nobody voted on one side.
pub fn is_unanimous(result: &str) -> bool {
    let tally = match result.split_once(',') {
        Some((_, tally)) => tally,
        None => return false,
    };
    match tally.split_once('-') {
        Some((for_count, against_count)) => {
            for_count.trim() == "0" || against_count.trim() == "0"
        }
        None => false,
    }
}

pub fn read_tmmis_file(path: &str, cfs: &FileSource) -> CouncilResult<Vec<VoteRecord>> {
    let file = File::open(path).context(OpeningCsvSnafu { path })?;
    read_tmmis(file, cfs)
}

pub fn read_tmmis<R: Read>(input: R, cfs: &FileSource) -> CouncilResult<Vec<VoteRecord>> {
    let rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(input);
    read_records(rdr, cfs)
}

fn read_records<R: Read>(mut rdr: csv::Reader<R>, cfs: &FileSource) -> CouncilResult<Vec<VoteRecord>> {
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    let cols = TmmisColumns::find(&header)?;
    let drop_unanimous = cfs.drop_unanimous.unwrap_or(false);

    let mut res: Vec<VoteRecord> = Vec::new();
    let mut num_skipped: usize = 0;
    for (idx, line_r) in rdr.records().enumerate() {
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cell = |i: usize| line.get(i).unwrap_or("").trim();

        if let Some(committee) = cfs.committee.as_deref() {
            if cell(cols.committee) != committee {
                num_skipped += 1;
                continue;
            }
        }
        if drop_unanimous && is_unanimous(cell(cols.result)) {
            num_skipped += 1;
            continue;
        }
        if let Some(pattern) = cfs.exclude_agenda_pattern.as_deref() {
            if cell(cols.agenda_item).contains(pattern) {
                num_skipped += 1;
                continue;
            }
        }

        let councillor = cfs.rename(&format!(
            "{} {}",
            cfs.rename(cell(cols.first_name)),
            cfs.rename(cell(cols.last_name))
        ));
        let key = VoteKey {
            agenda_item: cell(cols.agenda_item).to_string(),
            motion_type: cell(cols.motion_type).to_string(),
            description: cell(cols.description).to_string(),
            result: cell(cols.result).to_string(),
            date: cell(cols.date).to_string(),
        };
        debug!("read_tmmis: line {}: {:?} {:?}", lineno, councillor, key);
        res.push(VoteRecord {
            councillor,
            vote_id: key.identifier(),
            choice: cell(cols.vote).to_string(),
        });
    }
    info!(
        "read_tmmis: {} records kept, {} skipped",
        res.len(),
        num_skipped
    );
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const HEADER: &str = "Term,First Name,Last Name,Committee,Date/Time,Agenda Item #,Agenda Item Title,Motion Type,Vote,Result,Vote Description";

    fn source() -> FileSource {
        let mut renames = BTreeMap::new();
        renames.insert("BailÃ£o".to_string(), "Bailão".to_string());
        FileSource {
            provider: "tmmis".to_string(),
            file_path: "member-voting-record-2018-2022.csv".to_string(),
            committee: Some("City Council".to_string()),
            drop_unanimous: Some(true),
            exclude_agenda_pattern: Some("BL".to_string()),
            councillor_column: None,
            drop_columns: None,
            drop_rows: None,
            excel_worksheet_name: None,
            renames: Some(renames),
        }
    }

    fn read(lines: &[&str], cfs: &FileSource) -> CouncilResult<Vec<VoteRecord>> {
        let mut data = HEADER.to_string();
        for l in lines {
            data.push('\n');
            data.push_str(l);
        }
        read_tmmis(data.as_bytes(), cfs)
    }

    #[test]
    fn unanimous_results() {
        assert!(is_unanimous("Carried, 25-0"));
        assert!(is_unanimous("Lost, 0-24"));
        assert!(!is_unanimous("Carried, 20-5"));
        assert!(!is_unanimous("Carried"));
    }

    #[test]
    fn filters_and_names() {
        let records = read(
            &[
                "2018-2022,Ana,BailÃ£o,City Council,2019-01-30 10:00 AM,CC1.1,Budget,Adopt Item,Yes,\"Carried, 20-5\",Adopt",
                "2018-2022,Ana,BailÃ£o,Executive Committee,2019-01-20 10:00 AM,EX1.1,Budget,Adopt Item,Yes,\"Carried, 5-1\",Adopt",
                "2018-2022,Ana,BailÃ£o,City Council,2019-01-30 11:00 AM,CC1.2,Minutes,Adopt Item,Yes,\"Carried, 25-0\",Adopt",
                "2018-2022,Ana,BailÃ£o,City Council,2019-01-30 12:00 PM,BL1.1,Bills,Adopt Item,No,\"Carried, 20-5\",Bills",
                "2018-2022,Paula,Fletcher,City Council,2019-01-30 10:00 AM,CC1.1,Budget,Adopt Item,No,\"Carried, 20-5\",Adopt",
            ],
            &source(),
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].councillor, "Ana Bailão");
        assert_eq!(records[0].choice, "Yes");
        assert_eq!(
            records[0].vote_id,
            "CC1.1 Adopt Item Adopt Carried, 20-5 2019-01-30 10:00 AM"
        );
        assert_eq!(records[0].vote_id, records[1].vote_id);
        assert_eq!(records[1].councillor, "Paula Fletcher");
    }

    #[test]
    fn keeps_everything_without_filters() {
        let mut cfs = source();
        cfs.committee = None;
        cfs.drop_unanimous = None;
        cfs.exclude_agenda_pattern = None;
        let records = read(
            &[
                "t,A,B,Executive Committee,d,EX1.1,x,Adopt Item,Yes,\"Carried, 5-0\",x",
                "t,A,B,City Council,d,BL1.1,x,Adopt Item,No,\"Carried, 5-0\",x",
            ],
            &cfs,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn missing_column() {
        let res = read_tmmis("First Name,Last Name,Vote\nA,B,Yes".as_bytes(), &source());
        assert!(matches!(res, Err(CouncilError::MissingColumn { .. })));
    }
}
