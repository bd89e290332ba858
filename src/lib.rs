pub mod ais;
pub mod assemble;
pub mod catalog;
pub mod clip;
pub mod error;
pub mod footprint;
pub mod matcher;
pub mod model;
pub mod output;
pub mod projection;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgAction, Command};
use log::{error, info, warn};
use rayon::prelude::*;

use assemble::TileLabelAssembler;
use footprint::{FootprintBuilder, RotationConvention};
use model::{TileDescriptor, VesselRecord};
use output::EmptyLabelPolicy;

#[derive(Debug)]
pub struct Config {
    pub ais_paths: Vec<PathBuf>,
    pub catalog_path: PathBuf,
    pub output_dir: PathBuf,
    pub rotation: RotationConvention,
    pub empty_policy: EmptyLabelPolicy,
}

fn command() -> Command {
    Command::new("ais_labels")
        .version("0.1")
        .about("build oriented vessel footprint labels for satellite tiles from AIS day files")
        .arg(
            Arg::new("ais")
                .short('f')
                .long("ais-file")
                .action(ArgAction::Append)
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("AIS day file (csv), repeatable"),
        )
        .arg(
            Arg::new("tiles")
                .short('t')
                .long("tiles")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("tile catalog (GeoJSON FeatureCollection)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("output root directory"),
        )
        .arg(
            Arg::new("rotation")
                .long("rotation")
                .default_value("ccw")
                .value_parser(["ccw", "compass"])
                .help("how headings rotate hull rectangles"),
        )
        .arg(
            Arg::new("write-empty")
                .long("write-empty")
                .action(ArgAction::SetTrue)
                .help("write an empty FeatureCollection for tiles without labels"),
        )
}

pub fn get_arg() -> Result<Config> {
    config_from(command().get_matches())
}

pub fn config_from(matches: clap::ArgMatches) -> Result<Config> {
    let ais_paths = matches
        .get_many::<PathBuf>("ais")
        .unwrap_or_default()
        .cloned()
        .collect::<Vec<PathBuf>>();

    let catalog_path = matches
        .get_one::<PathBuf>("tiles")
        .cloned()
        .unwrap_or_default();
    let output_dir = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_default();

    let rotation = matches
        .get_one::<String>("rotation")
        .map(|s| s.parse::<RotationConvention>())
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();

    let empty_policy = if matches.get_flag("write-empty") {
        EmptyLabelPolicy::WriteEmpty
    } else {
        EmptyLabelPolicy::Skip
    };

    Ok(Config {
        ais_paths,
        catalog_path,
        output_dir,
        rotation,
        empty_policy,
    })
}

/// outcome of one AIS day
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DaySummary {
    pub tiles: usize,
    pub files_written: usize,
    pub labels: usize,
    pub failed_tiles: usize,
    pub skipped_vessels: usize,
}

const AIS_DAY_FORMAT: &str = "%Y%m%d";

/// date in an AIS day file name, `aisdk_20210101.csv` -> 2021-01-01
pub fn day_date(ais_path: &Path) -> Option<NaiveDate> {
    let stem = ais_path.file_stem()?.to_str()?;
    let date = stem.split('_').nth(1)?;
    NaiveDate::parse_from_str(date, AIS_DAY_FORMAT).ok()
}

/// output folder name of an AIS day file: its date as `YYYY-MM-DD`, otherwise the file stem
pub fn day_folder(ais_path: &Path) -> String {
    match day_date(ais_path) {
        Some(day) => day.format("%Y-%m-%d").to_string(),
        None => ais_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

/// tiles whose acquisition starts on `day`, every tile if the day is unknown
pub fn tiles_of_day(tiles: &[TileDescriptor], day: Option<NaiveDate>) -> Vec<&TileDescriptor> {
    match day {
        Some(day) => tiles
            .iter()
            .filter(|tile| tile.window.start.date_naive() == day)
            .collect(),
        None => tiles.iter().collect(),
    }
}

pub fn run(config: Config) -> Result<()> {
    info!("config is {:?}", config);

    let assembler = TileLabelAssembler::new(FootprintBuilder::new(config.rotation));

    let mut tiles: Vec<TileDescriptor> = Vec::new();
    let mut failed_tiles = 0;
    for tile in catalog::read_tile_catalog(&config.catalog_path)? {
        match tile {
            Ok(tile) => tiles.push(tile),
            Err(e) => {
                error!("{e}. skipping");
                failed_tiles += 1;
            }
        }
    }

    for path in &config.ais_paths {
        let batch = ais::read_ais_csv(path)?;
        let out_dir = config.output_dir.join(day_folder(path));

        let day = day_date(path);
        if day.is_none() {
            warn!("{}: no date in the file name, using every tile", path.display());
        }
        let day_tiles = tiles_of_day(&tiles, day);

        let mut summary = process_day(
            &assembler,
            &batch.records,
            &day_tiles,
            &out_dir,
            config.empty_policy,
        );
        summary.failed_tiles += failed_tiles;

        info!(
            "{}: {} tiles, {} files, {} labels, {} failed tiles",
            path.display(),
            summary.tiles,
            summary.files_written,
            summary.labels,
            summary.failed_tiles
        );
        info!(
            "{}: skipped {} vessels and {} rows",
            path.display(),
            summary.skipped_vessels,
            batch.skipped
        );
    }

    Ok(())
}

/// label the tiles of one AIS day in parallel. A failing tile is logged and counted,
/// the others go on.
pub fn process_day(
    assembler: &TileLabelAssembler,
    records: &[VesselRecord],
    tiles: &[&TileDescriptor],
    out_dir: &Path,
    policy: EmptyLabelPolicy,
) -> DaySummary {
    tiles
        .par_iter()
        .map(|tile| {
            let assembly = assembler.assemble(records, &tile.window, &tile.footprint);
            let mut summary = DaySummary {
                tiles: 1,
                labels: assembly.labels.len(),
                skipped_vessels: assembly.skipped.len(),
                ..Default::default()
            };

            match output::write_labels(out_dir, tile.tile_id(), &assembly.labels, policy) {
                Ok(Some(_)) => summary.files_written = 1,
                Ok(None) => {}
                Err(e) => {
                    error!("tile {}: {:#}", tile.tile_id(), e);
                    summary.failed_tiles = 1;
                }
            }
            summary
        })
        .reduce(DaySummary::default, |a, b| DaySummary {
            tiles: a.tiles + b.tiles,
            files_written: a.files_written + b.files_written,
            labels: a.labels + b.labels,
            failed_tiles: a.failed_tiles + b.failed_tiles,
            skipped_vessels: a.skipped_vessels + b.skipped_vessels,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use geo::polygon;
    use model::{TileFootprint, TimeWindow};

    fn tile(tile_id: &str, start: DateTime<Utc>) -> TileDescriptor {
        let poly = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        TileDescriptor {
            window: TimeWindow::new(tile_id, start, start).unwrap(),
            footprint: TileFootprint::new(tile_id, poly).unwrap(),
        }
    }

    fn ids(tiles: &[TileDescriptor], day: Option<NaiveDate>) -> Vec<&str> {
        tiles_of_day(tiles, day)
            .into_iter()
            .map(|t| t.tile_id())
            .collect()
    }

    #[test]
    fn day_folder_names() {
        assert_eq!(
            day_folder(Path::new("/data/input/aisdk_20210101.csv")),
            "2021-01-01"
        );
        assert_eq!(
            day_folder(Path::new("aisdk-2021-01-01.csv")),
            "aisdk-2021-01-01"
        );
        assert_eq!(day_folder(Path::new("aisdk_latest.csv")), "aisdk_latest");
    }

    #[test]
    fn day_dates() {
        assert_eq!(
            day_date(Path::new("aisdk_20210102.csv")),
            NaiveDate::from_ymd_opt(2021, 1, 2)
        );
        assert_eq!(day_date(Path::new("aisdk_latest.csv")), None);
        assert_eq!(day_date(Path::new("20210102.csv")), None);
    }

    #[test]
    fn tiles_are_matched_by_acquisition_day() {
        let tiles = vec![
            tile("A", Utc.with_ymd_and_hms(2021, 1, 1, 10, 34, 31).unwrap()),
            tile("B", Utc.with_ymd_and_hms(2021, 1, 2, 0, 0, 0).unwrap()),
            tile("C", Utc.with_ymd_and_hms(2021, 1, 1, 23, 59, 59).unwrap()),
        ];
        let jan1 = NaiveDate::from_ymd_opt(2021, 1, 1);
        let jan2 = NaiveDate::from_ymd_opt(2021, 1, 2);
        let jan3 = NaiveDate::from_ymd_opt(2021, 1, 3);

        assert_eq!(ids(&tiles, jan1), vec!["A", "C"]);
        assert_eq!(ids(&tiles, jan2), vec!["B"]);
        assert!(ids(&tiles, jan3).is_empty());
        assert_eq!(ids(&tiles, None), vec!["A", "B", "C"]);
    }

    #[test]
    fn cli_arguments() {
        let args = "ais_labels -f a.csv --ais-file b.csv -t tiles.geojson -o out \
                    --rotation compass --write-empty";
        let matches = command().get_matches_from(args.split_whitespace());
        let config = config_from(matches).unwrap();

        assert_eq!(
            config.ais_paths,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]
        );
        assert_eq!(config.catalog_path, PathBuf::from("tiles.geojson"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.rotation, RotationConvention::Compass);
        assert_eq!(config.empty_policy, EmptyLabelPolicy::WriteEmpty);
    }

    #[test]
    fn cli_defaults() {
        let args = "ais_labels -f a.csv -t tiles.geojson -o out";
        let matches = command().get_matches_from(args.split_whitespace());
        let config = config_from(matches).unwrap();

        assert_eq!(config.rotation, RotationConvention::CounterClockwise);
        assert_eq!(config.empty_policy, EmptyLabelPolicy::Skip);
    }

    #[test]
    fn command_is_consistent() {
        command().debug_assert();
    }
}
