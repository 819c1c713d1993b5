use clap::Parser;

/// Voting similarity between the members of a council.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The JSON file describing the datasets, terms and sources to ingest.
    /// See the manual of the vote_similarity library for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) Similarities computed by a previous run. With --config, terms whose
    /// votes did not change are not computed again. Without --config, they are used as is.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the similarities will be written in JSON format
    /// to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing similarities in JSON format. If provided, councilsim
    /// will check that the computed similarities match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (optional) The dataset to display. Defaults to the first dataset.
    #[clap(long, value_parser)]
    pub dataset: Option<String>,

    /// (optional) The term to display. Defaults to the last term of the dataset.
    #[clap(long, value_parser)]
    pub term: Option<String>,

    /// (optional) The councillor to sort the display by. Defaults to the mayor of the term.
    #[clap(long, value_parser)]
    pub sort_by: Option<String>,

    /// (list, optional) The councillors that did not serve the full term are hidden by default.
    /// Accepted values: early-departures, temporary.
    #[clap(long, value_parser = clap::builder::PossibleValuesParser::new(["early-departures", "temporary"]))]
    pub include: Vec<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
