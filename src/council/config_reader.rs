use crate::council::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    // tmmis
    #[serde(rename = "committee")]
    pub committee: Option<String>,
    #[serde(rename = "dropUnanimous")]
    pub drop_unanimous: Option<bool>,
    #[serde(rename = "excludeAgendaPattern")]
    pub exclude_agenda_pattern: Option<String>,
    // scorecards
    #[serde(rename = "councillorColumn")]
    pub councillor_column: Option<String>,
    #[serde(rename = "dropColumns")]
    pub drop_columns: Option<Vec<String>>,
    #[serde(rename = "dropRows")]
    pub drop_rows: Option<Vec<usize>>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    // all providers
    #[serde(rename = "renames")]
    pub renames: Option<BTreeMap<String, String>>,
}

impl FileSource {
    /// The corrected spelling of a name, or the name itself.
    pub fn rename(&self, name: &str) -> String {
        match self.renames.as_ref().and_then(|r| r.get(name)) {
            Some(renamed) => renamed.clone(),
            None => name.to_string(),
        }
    }

    pub fn councillor_column(&self) -> &str {
        self.councillor_column.as_deref().unwrap_or("Councillor")
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TermConfig {
    pub term: String,
    /// The mayor of the term, followed by tie-breakers.
    #[serde(default)]
    pub anchors: Vec<String>,
    #[serde(rename = "acceptConsensus")]
    pub accept_consensus: Option<bool>,
    pub sources: Vec<FileSource>,
}

impl TermConfig {
    pub fn rules(&self) -> NormalizationRules {
        NormalizationRules {
            accept_consensus: self.accept_consensus.unwrap_or(false),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    pub terms: Vec<TermConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VacancyReasonConfig {
    EarlyDeparture,
    TemporaryAppointment,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VacancyConfig {
    pub reason: VacancyReasonConfig,
    #[serde(default)]
    pub replacements: Vec<String>,
}

/// Councillor name to vacancy, for one term.
pub type TermVacancies = BTreeMap<String, VacancyConfig>;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CouncilConfig {
    pub datasets: Vec<DatasetConfig>,
    /// Term to vacancies. Vacancies belong to the council, they are shared by
    /// all the datasets.
    #[serde(default)]
    pub vacancies: BTreeMap<String, TermVacancies>,
    /// A CSV file with the early departures and the temporary appointments of
    /// every term, merged with `vacancies`.
    #[serde(rename = "vacanciesFile")]
    pub vacancies_file: Option<String>,
}

impl CouncilConfig {
    pub fn term_vacancies(&self, term: &str) -> TermVacancies {
        self.vacancies.get(term).cloned().unwrap_or_default()
    }
}

pub fn to_vacancy_metadata(vacancies: &TermVacancies) -> VacancyMetadata {
    let mut res = VacancyMetadata::new();
    for (name, v) in vacancies.iter() {
        let reason = match v.reason {
            VacancyReasonConfig::EarlyDeparture => VacancyReason::EarlyDeparture,
            VacancyReasonConfig::TemporaryAppointment => VacancyReason::TemporaryAppointment,
        };
        res.insert(name, reason, &v.replacements);
    }
    res
}

pub fn parse_config(contents: &str) -> CouncilResult<CouncilConfig> {
    let config: CouncilConfig = serde_json::from_str(contents).context(ParsingJsonSnafu {})?;
    for dataset in config.datasets.iter() {
        for term in dataset.terms.iter() {
            if term.sources.is_empty() {
                whatever!(
                    "no file sources for term {} of dataset {}",
                    term.term,
                    dataset.name
                );
            }
        }
    }
    Ok(config)
}

pub fn read_config(path: &str) -> CouncilResult<CouncilConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let mut config = parse_config(&contents)?;
    if let Some(vacancies_file) = config.vacancies_file.clone() {
        let root = config_root(path)?;
        let p = source_path(&root, &vacancies_file);
        let from_file = read_vacancies_file(&p)?;
        for (term, entries) in from_file.into_iter() {
            let term_entries = config.vacancies.entry(term).or_default();
            for (name, v) in entries.into_iter() {
                term_entries.entry(name).or_insert(v);
            }
        }
    }
    Ok(config)
}

/// The directory against which the sources of a configuration are resolved.
pub fn config_root(config_path: &str) -> CouncilResult<String> {
    let p = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;
    Ok(p.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
      "datasets": [{
        "name": "Key Votes (City Hall Watcher)",
        "terms": [{
          "term": "2022-2026",
          "anchors": ["Olivia Chow", "Ausma Malik"],
          "acceptConsensus": true,
          "sources": [
            {"provider": "scorecard_csv", "filePath": "Council Scorecard 2022-2023.csv",
             "councillorColumn": "Unnamed: 3", "dropColumns": ["SORT"], "dropRows": [0, 1, 2]},
            {"provider": "scorecard_csv", "filePath": "Council Scorecard 2023-2026.csv",
             "renames": {"BailÃ£o": "Bailão"}}
          ]
        }]
      }],
      "vacancies": {
        "2022-2026": {
          "Gary Crawford": {"reason": "earlyDeparture", "replacements": ["Parthi Kandavel"]},
          "Temp": {"reason": "temporaryAppointment"}
        }
      }
    }"#;

    #[test]
    fn reads_config() {
        let config = parse_config(CONFIG).unwrap();
        let term = &config.datasets[0].terms[0];
        assert!(term.rules().accept_consensus);
        assert_eq!(term.anchors, vec!["Olivia Chow", "Ausma Malik"]);
        assert_eq!(term.sources[0].councillor_column(), "Unnamed: 3");
        assert_eq!(term.sources[1].councillor_column(), "Councillor");
        assert_eq!(term.sources[1].rename("BailÃ£o"), "Bailão");
        assert_eq!(term.sources[0].rename("BailÃ£o"), "BailÃ£o");

        let vacancies = to_vacancy_metadata(&config.term_vacancies("2022-2026"));
        assert_eq!(
            vacancies.reason("Gary Crawford"),
            Some(VacancyReason::EarlyDeparture)
        );
        assert_eq!(
            vacancies.reason("Temp"),
            Some(VacancyReason::TemporaryAppointment)
        );
        assert!(config.term_vacancies("2010-2014").is_empty());
    }

    #[test]
    fn rejects_terms_without_sources() {
        let config = r#"{"datasets": [{"name": "d", "terms": [{"term": "t", "sources": []}]}]}"#;
        assert!(parse_config(config).is_err());
        let config = r#"{"datasets": [{"name": "d", "terms": [{"term": "t", "sources": [
            {"provider": "tmmis", "filePath": "x.csv"}]}]}],
            "vacancies": {"t": {"A": {"reason": "resigned"}}}}"#;
        assert!(matches!(
            parse_config(config),
            Err(CouncilError::ParsingJson { .. })
        ));
    }
}
