use clap::{App, Arg};
use std::ffi::OsString;
use std::path::PathBuf;

pub struct Args {
    pub spending_file: PathBuf,
    pub income_file: PathBuf,
}

impl Args {
    pub fn parse() -> Self {
        Self::from_matches(Self::app().get_matches())
    }

    /// Parses an explicit argument list, the first item being the program
    /// name. Exits the process on invalid input, like `parse`.
    pub fn parse_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::from_matches(Self::app().get_matches_from(args))
    }

    fn app() -> App<'static, 'static> {
        App::new("spending_charts")
            .version("0.1.0")
            .about("Renders spending and income breakdown pie charts from CSV files")
            .arg(
                Arg::with_name("spending_file")
                    .long("spending-file")
                    .takes_value(true)
                    .default_value("spending.csv")
                    .help("path of the spending CSV file (header row, then date,cost,category)"),
            )
            .arg(
                Arg::with_name("income_file")
                    .long("income-file")
                    .takes_value(true)
                    .default_value("income.csv")
                    .help("path of the income CSV file (no header, category,amount)"),
            )
    }

    fn from_matches(matches: clap::ArgMatches<'_>) -> Self {
        Self {
            spending_file: PathBuf::from(matches.value_of_os("spending_file").unwrap_or_default()),
            income_file: PathBuf::from(matches.value_of_os("income_file").unwrap_or_default()),
        }
    }
}
