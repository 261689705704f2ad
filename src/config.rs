use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::data::DataSource;
use crate::query::{AgeFilter, Criteria, YearSelection};
use crate::state::{ExplorerOptions, View};

pub const DEFAULT_GEO_URL: &str =
    "https://raw.githubusercontent.com/cihadturhan/tr-geojson/master/geo/tr-cities-utf8.json";

#[derive(Parser, Debug)]
#[command(author, version, about = "Workplace fatality map, table and analytics for Turkey", long_about = None)]
pub struct Cli {
    /// Dataset: JSON array of records, local path or http(s) URL
    #[arg(long, global = true, env = "ISIG_DATA", default_value = "data.json", value_hint = ValueHint::AnyPath)]
    pub data: String,

    /// Province GeoJSON, local path or http(s) URL
    #[arg(long, global = true, env = "ISIG_GEO", default_value = DEFAULT_GEO_URL)]
    pub geo: String,

    /// Log file for the interactive pages
    #[arg(long, global = true, default_value = "isig-atlas.log", value_hint = ValueHint::FilePath)]
    pub log_file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Map and table of individual records (default)
    Explore(ExploreArgs),
    /// Monthly, sector, age, province and yearly charts
    Analytics(AnalyticsArgs),
    /// Single record profile
    Profile(ProfileArgs),
    /// Write the filtered records as CSV without opening the terminal UI
    Export(ExportArgs),
    /// Write the filtered map markers as GeoJSON
    Markers(MarkersArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Explore(ExploreArgs::default())
    }
}

fn parse_year(text: &str) -> Result<YearSelection, String> {
    text.parse()
}

#[derive(Args, Debug, Clone)]
pub struct ExploreArgs {
    /// Initial view: map or table (`#map`/`#table` accepted)
    #[arg(long, default_value = "map")]
    pub view: String,

    /// Initial year (`all` or e.g. 2024)
    #[arg(long, default_value = "all", value_parser = parse_year)]
    pub year: YearSelection,

    /// Hide the year control
    #[arg(long = "no-year-filter", action = ArgAction::SetTrue)]
    pub no_year_filter: bool,

    /// Colour markers of workers under 18
    #[arg(long = "highlight-children", action = ArgAction::SetTrue)]
    pub highlight_children: bool,
}

impl Default for ExploreArgs {
    fn default() -> Self {
        Self {
            view: "map".to_string(),
            year: YearSelection::All,
            no_year_filter: false,
            highlight_children: false,
        }
    }
}

impl ExploreArgs {
    pub fn options(&self) -> ExplorerOptions {
        ExplorerOptions {
            year_filter: !self.no_year_filter,
            highlight_children: self.highlight_children,
        }
    }

    /// The view as a location fragment
    pub fn fragment(&self) -> &'static str {
        View::from_fragment(&self.view).fragment()
    }
}

#[derive(Args, Debug, Clone)]
pub struct AnalyticsArgs {
    /// Page year (`all` or e.g. 2025)
    #[arg(long, default_value = "all", value_parser = parse_year)]
    pub year: YearSelection,
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    /// Record id
    pub id: Option<String>,
}

/// Filters shared by the headless commands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long)]
    pub sector: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub age_min: Option<u32>,
    #[arg(long)]
    pub age_max: Option<u32>,
    #[arg(long, default_value = "all", value_parser = parse_year)]
    pub year: YearSelection,
}

impl FilterArgs {
    pub fn criteria(&self) -> Criteria {
        Criteria {
            gender: self.gender.clone(),
            sector: self.sector.clone(),
            city: self.city.clone(),
            age: AgeFilter::new(self.age_min, self.age_max),
            year: self.year,
            ..Criteria::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Directory the CSV is written into
    #[arg(long, default_value = ".", value_hint = ValueHint::DirPath)]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

#[derive(Args, Debug, Clone)]
pub struct MarkersArgs {
    /// Output GeoJSON file
    #[arg(long, default_value = "markers.geojson", value_hint = ValueHint::FilePath)]
    pub out: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl Cli {
    pub fn data_source(&self) -> DataSource {
        DataSource::parse(&self.data)
    }

    pub fn geo_source(&self) -> DataSource {
        DataSource::parse(&self.geo)
    }

    /// Interactive pages log to a file; headless commands to stderr
    pub fn is_interactive(&self) -> bool {
        !matches!(
            self.command,
            Some(Command::Export(_)) | Some(Command::Markers(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_explore() {
        let cli = Cli::try_parse_from(["isig-atlas"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.is_interactive());
        assert_eq!(cli.geo, DEFAULT_GEO_URL);
        assert_eq!(cli.geo_source(), DataSource::Url(DEFAULT_GEO_URL.to_string()));
    }

    #[test]
    fn test_explore_flags() {
        let cli = Cli::try_parse_from([
            "isig-atlas",
            "explore",
            "--view",
            "#table",
            "--year",
            "2024",
            "--no-year-filter",
        ])
        .unwrap();
        let Some(Command::Explore(args)) = cli.command else {
            panic!("expected explore");
        };
        assert_eq!(args.fragment(), "#table");
        assert_eq!(args.year, YearSelection::Year(2024));
        assert!(!args.options().year_filter);
        assert!(!args.options().highlight_children);
    }

    #[test]
    fn test_export_filters() {
        let cli = Cli::try_parse_from([
            "isig-atlas",
            "--data",
            "records.json",
            "export",
            "--out-dir",
            "/tmp",
            "--city",
            "Ankara",
            "--age-max",
            "17",
        ])
        .unwrap();
        assert!(!cli.is_interactive());
        assert_eq!(cli.data_source(), DataSource::Path(PathBuf::from("records.json")));
        let Some(Command::Export(args)) = cli.command else {
            panic!("expected export");
        };
        let criteria = args.filters.criteria();
        assert_eq!(criteria.city.as_deref(), Some("Ankara"));
        assert_eq!(criteria.age, AgeFilter::new(None, Some(17)));
        assert_eq!(criteria.year, YearSelection::All);
    }

    #[test]
    fn test_invalid_year_rejected() {
        assert!(Cli::try_parse_from(["isig-atlas", "analytics", "--year", "last"]).is_err());
    }
}
