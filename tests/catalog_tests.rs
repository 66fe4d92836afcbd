// tests/catalog_tests.rs
use chrono::NaiveDate;
use clap::Parser;
use nbr_calc::catalog::footprint::geojson_to_wkt;
use nbr_calc::catalog::scihub::{find_media_src, parse_node_listing, parse_search_response};
use nbr_calc::catalog::{
    read_footprint, FixedIndex, InteractiveSelector, LowestCloudCover, Scene, SceneQuery,
    SceneSelector,
};
use nbr_calc::cli::{Cli, Commands, SelectMode};
use nbr_calc::config::PipelineConfig;
use nbr_calc::error::NbrError;
use nbr_calc::processing::align::AlignPolicy;
use nbr_calc::processing::indices::ZeroDenominator;
use serde_json::json;
use std::io::Cursor;
use std::path::PathBuf;

fn scene(id: &str, cloud_cover: f64) -> Scene {
    Scene {
        id: id.to_string(),
        title: format!("S2A_MSIL2A_{id}"),
        filename: format!("S2A_MSIL2A_{id}.SAFE"),
        begin_position: "2021-08-14T11:06:21.024Z".to_string(),
        cloud_cover,
        link_alternative: format!("https://hub.example/odata/v1/Products('{id}')/"),
    }
}

#[test]
fn test_polygon_feature_collection_to_wkt() {
    let aoi = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [-4.123456, 40.5], [-4.0, 40.5], [-4.0, 40.6], [-4.123456, 40.6], [-4.123456, 40.5]
                ]]
            }
        }]
    });

    assert_eq!(
        geojson_to_wkt(&aoi).unwrap(),
        "POLYGON((-4.1235 40.5,-4 40.5,-4 40.6,-4.1235 40.6,-4.1235 40.5))"
    );
}

#[test]
fn test_point_and_multipolygon_to_wkt() {
    let point = json!({"type": "Point", "coordinates": [2.5, 41.25, 100.0]});
    assert_eq!(geojson_to_wkt(&point).unwrap(), "POINT(2.5 41.25)");

    let multi = json!({
        "type": "Feature",
        "geometry": {
            "type": "MultiPolygon",
            "coordinates": [
                [[[0, 0], [1, 0], [1, 1], [0, 0]]],
                [[[2, 2], [3, 2], [3, 3], [2, 2]]]
            ]
        }
    });
    assert_eq!(
        geojson_to_wkt(&multi).unwrap(),
        "MULTIPOLYGON(((0 0,1 0,1 1,0 0)),((2 2,3 2,3 3,2 2)))"
    );
}

#[test]
fn test_lines_and_point_sets_to_wkt() {
    let line = json!({"type": "LineString", "coordinates": [[0.123456, 0], [1, 1.00004]]});
    assert_eq!(geojson_to_wkt(&line).unwrap(), "LINESTRING(0.1235 0,1 1)");

    let lines = json!({
        "type": "MultiLineString",
        "coordinates": [[[0, 0], [1, 1]], [[2, 2], [3, 3]]]
    });
    assert_eq!(
        geojson_to_wkt(&lines).unwrap(),
        "MULTILINESTRING((0 0,1 1),(2 2,3 3))"
    );

    let points = json!({"type": "MultiPoint", "coordinates": [[-3.654321, 40.1], [-3.5, 40.2]]});
    let wkt = geojson_to_wkt(&points).unwrap();
    assert!(wkt.starts_with("MULTIPOINT"), "{wkt}");
    assert!(wkt.contains("-3.6543 40.1") && wkt.contains("-3.5 40.2"), "{wkt}");
}

#[test]
fn test_geometry_collection_to_wkt() {
    let collection = json!({
        "type": "Feature",
        "properties": {"name": "burn scar"},
        "geometry": {
            "type": "GeometryCollection",
            "geometries": [
                {"type": "Point", "coordinates": [2.123456, 41.0]},
                {"type": "LineString", "coordinates": [[0, 0], [1, 1]]}
            ]
        }
    });

    let wkt = geojson_to_wkt(&collection).unwrap();
    assert!(wkt.starts_with("GEOMETRYCOLLECTION("), "{wkt}");
    assert!(wkt.contains("POINT(2.1235 41)"), "{wkt}");
    assert!(wkt.contains("LINESTRING(0 0,1 1)"), "{wkt}");
}

#[test]
fn test_invalid_footprints() {
    let empty = json!({"type": "FeatureCollection", "features": []});
    assert!(matches!(geojson_to_wkt(&empty), Err(NbrError::Footprint(_))));

    let no_geometry = json!({"type": "Feature", "properties": {}, "geometry": null});
    assert!(matches!(geojson_to_wkt(&no_geometry), Err(NbrError::Footprint(_))));

    let short_position = json!({"type": "LineString", "coordinates": [[0, 0], [1]]});
    assert!(matches!(geojson_to_wkt(&short_position), Err(NbrError::Footprint(_))));

    let open_ring = json!({"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [0, 0]]]});
    assert!(matches!(geojson_to_wkt(&open_ring), Err(NbrError::Footprint(_))));

    assert!(matches!(geojson_to_wkt(&json!({})), Err(NbrError::Footprint(_))));
}

#[test]
fn test_read_footprint_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("aoi.geojson");
    std::fs::write(&path, r#"{"type": "Point", "coordinates": [1, 2]}"#).unwrap();

    assert_eq!(read_footprint(&path).unwrap(), "POINT(1 2)");
    assert!(matches!(
        read_footprint(&dir.path().join("missing.geojson")),
        Err(NbrError::Io(_))
    ));
}

#[test]
fn test_query_window() {
    let config = PipelineConfig {
        search_window_days: 10,
        ..PipelineConfig::default()
    };
    let today = NaiveDate::from_ymd_opt(2021, 8, 20).unwrap();

    let query = SceneQuery::from_config(&config, "POINT(1 2)".to_string(), today);

    assert_eq!(query.start, NaiveDate::from_ymd_opt(2021, 8, 10).unwrap());
    assert_eq!(query.end, NaiveDate::from_ymd_opt(2021, 8, 21).unwrap());
    assert_eq!(
        query.to_opensearch(),
        "beginposition:[2021-08-10T00:00:00Z TO 2021-08-21T00:00:00Z] AND producttype:S2MSI2A \
         AND platformname:Sentinel-2 AND footprint:\"Intersects(POINT(1 2))\""
    );
}

#[test]
fn test_parse_search_response() {
    let body = json!({
        "feed": {
            "opensearch:totalResults": "2",
            "entry": [
                {
                    "id": "a1",
                    "title": "S2A_MSIL2A_20210814",
                    "link": [
                        {"href": "https://hub/odata/v1/Products('a1')/$value"},
                        {"rel": "alternative", "href": "https://hub/odata/v1/Products('a1')/"}
                    ],
                    "date": [{"name": "beginposition", "content": "2021-08-14T11:06:21.024Z"}],
                    "double": {"name": "cloudcoverpercentage", "content": "12.5"},
                    "str": [{"name": "filename", "content": "S2A_MSIL2A_20210814.SAFE"}]
                },
                {
                    "id": "b2",
                    "link": {"rel": "alternative", "href": "https://hub/odata/v1/Products('b2')/"},
                    "double": [{"name": "cloudcoverpercentage", "content": 3.0}],
                    "str": {"name": "filename", "content": "S2B_MSIL2A_20210816.SAFE"}
                }
            ]
        }
    });

    let scenes = parse_search_response(&body).unwrap();

    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].id, "a1");
    assert_eq!(scenes[0].filename, "S2A_MSIL2A_20210814.SAFE");
    assert_eq!(scenes[0].begin_position, "2021-08-14T11:06:21.024Z");
    assert_eq!(scenes[0].cloud_cover, 12.5);
    assert_eq!(scenes[0].link_alternative, "https://hub/odata/v1/Products('a1')/");
    assert_eq!(scenes[1].title, "S2B_MSIL2A_20210816.SAFE");
    assert_eq!(scenes[1].cloud_cover, 3.0);
}

#[test]
fn test_parse_search_response_single_and_empty() {
    let single = json!({
        "feed": {
            "entry": {
                "id": "only",
                "title": "T",
                "link": [{"rel": "alternative", "href": "https://hub/p/"}],
                "str": [{"name": "filename", "content": "T.SAFE"}]
            }
        }
    });
    let scenes = parse_search_response(&single).unwrap();
    assert_eq!(scenes.len(), 1);
    assert!(scenes[0].cloud_cover.is_nan());

    let empty = json!({"feed": {"opensearch:totalResults": "0"}});
    assert!(parse_search_response(&empty).unwrap().is_empty());

    assert!(matches!(
        parse_search_response(&json!({"error": "unauthorized"})),
        Err(NbrError::Catalog(_))
    ));
}

#[test]
fn test_band_files_are_found_by_suffix() {
    let listing = json!({
        "d": {
            "results": [
                {"Id": "T30TVK_20210814T110621_AOT_10m.jp2", "__metadata": {"media_src": "u/aot"}},
                {"Id": "T30TVK_20210814T110621_B02_10m.jp2", "__metadata": {"media_src": "u/b02"}},
                {"Id": "T30TVK_20210814T110621_B08_10m.jp2", "__metadata": {"media_src": "u/b08"}},
                {"Id": "T30TVK_20210814T110621_TCI_10m.jp2", "__metadata": {"media_src": "u/tci"}}
            ]
        }
    });

    let nodes = parse_node_listing(&listing).unwrap();
    assert_eq!(find_media_src(&nodes, "_B08_10m.jp2").unwrap(), "u/b08");
    assert_eq!(find_media_src(&nodes, "_TCI_10m.jp2").unwrap(), "u/tci");
    assert!(matches!(
        find_media_src(&nodes, "_B12_20m.jp2"),
        Err(NbrError::Catalog(_))
    ));
    assert!(parse_node_listing(&json!({"d": {}})).is_err());
}

#[test]
fn test_lowest_cloud_cover_selector() {
    let scenes = [scene("a", 40.0), scene("b", 2.5), scene("c", 2.5), scene("d", f64::NAN)];
    assert_eq!(LowestCloudCover.choose_scene(&scenes).unwrap(), 1);

    let unknown = [scene("a", f64::NAN), scene("b", f64::NAN)];
    assert_eq!(LowestCloudCover.choose_scene(&unknown).unwrap(), 0);

    assert!(matches!(
        LowestCloudCover.choose_scene(&[]),
        Err(NbrError::NoScenes)
    ));
}

#[test]
fn test_fixed_index_selector() {
    let scenes = [scene("a", 1.0), scene("b", 2.0)];
    assert_eq!(FixedIndex(1).choose_scene(&scenes).unwrap(), 1);
    assert!(matches!(
        FixedIndex(2).choose_scene(&scenes),
        Err(NbrError::Selection(_))
    ));
}

#[test]
fn test_interactive_selector_reprompts_on_bad_input() {
    let scenes = [scene("a", 10.0), scene("b", 20.0), scene("c", 30.0)];
    let selector = InteractiveSelector::new(Cursor::new("x\n7\n 2 \n"), Vec::new());

    assert_eq!(selector.choose_scene(&scenes).unwrap(), 2);

    let transcript = String::from_utf8(selector.into_output()).unwrap();
    assert!(transcript.contains("Id: 0 - Date: 2021-08-14T11:06:21.024Z - Cloud cover: 10.00%"));
    assert!(transcript.contains("Invalid choice: x"));
    assert!(transcript.contains("Invalid choice: 7"));
    assert_eq!(transcript.matches("Select a scene [0-2]: ").count(), 3);
}

#[test]
fn test_interactive_selector_eof() {
    let scenes = [scene("a", 10.0)];
    let selector = InteractiveSelector::new(Cursor::new(""), Vec::new());

    assert!(matches!(
        selector.choose_scene(&scenes),
        Err(NbrError::Selection(_))
    ));
}

#[test]
fn test_config_defaults_and_camel_case_keys() {
    let config: PipelineConfig = serde_json::from_str(
        r#"{
            "credentials": {"user": "someone", "pass": "secret"},
            "searchWindowDays": 30,
            "outputPath": "out/nbr.tif",
            "skipDownloadIfPresent": false,
            "zeroDenominator": {"noData": -999.0},
            "alignPolicy": "cropExcess"
        }"#,
    )
    .unwrap();

    assert_eq!(config.credentials.user, "someone");
    assert_eq!(config.credentials.pass, "secret");
    assert_eq!(config.search_window_days, 30);
    assert_eq!(config.output_path, PathBuf::from("out/nbr.tif"));
    assert!(!config.skip_download_if_present);
    assert_eq!(config.zero_denominator, ZeroDenominator::NoData(-999.0));
    assert_eq!(config.align_policy, AlignPolicy::CropExcess);
    assert_eq!(config.write_options().no_data, Some(-999.0));

    let defaults: PipelineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, PipelineConfig::default());
    assert_eq!(defaults.zero_denominator, ZeroDenominator::Propagate);
    assert!(defaults.skip_download_if_present);
    assert_eq!(defaults.nir_path(), PathBuf::from("./nir_B08_10m.jp2"));
}

#[test]
fn test_config_validation() {
    let zero_days = PipelineConfig {
        search_window_days: 0,
        ..PipelineConfig::default()
    };
    assert!(matches!(zero_days.validate(), Err(NbrError::Config(_))));

    let same_files = PipelineConfig {
        swir_file: "band.jp2".to_string(),
        nir_file: "band.jp2".to_string(),
        ..PipelineConfig::default()
    };
    assert!(matches!(same_files.validate(), Err(NbrError::Config(_))));

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"outputPath": ""}"#).unwrap();
    assert!(matches!(
        PipelineConfig::from_file(&path),
        Err(NbrError::Config(_))
    ));
}

#[test]
fn test_cli_overrides() {
    let cli = Cli::try_parse_from([
        "nbr-calc",
        "run",
        "aoi.geojson",
        "--days",
        "3",
        "--force-download",
        "--select",
        "lowest-cloud",
        "-o",
        "burn.tif",
    ])
    .unwrap();

    let mut config = PipelineConfig::default();
    cli.apply_overrides(&mut config);

    assert_eq!(config.search_window_days, 3);
    assert!(!config.skip_download_if_present);
    assert_eq!(config.output_path, PathBuf::from("burn.tif"));
    match cli.command {
        Commands::Run { select, scene, .. } => {
            assert_eq!(select, SelectMode::LowestCloud);
            assert_eq!(scene, None);
        }
        _ => panic!("Expected run command"),
    }
}

#[test]
fn test_cli_compute_keeps_config_values() {
    let cli = Cli::try_parse_from(["nbr-calc", "compute", "-a", "b08.jp2", "-b", "b12.jp2"]).unwrap();

    let mut config = PipelineConfig {
        search_window_days: 7,
        ..PipelineConfig::default()
    };
    cli.apply_overrides(&mut config);

    assert_eq!(config.search_window_days, 7);
    assert_eq!(config.output_path, PathBuf::from("nbr.tif"));
}
