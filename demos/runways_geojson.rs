use std::{env::args_os, fs, io, path::Path};

use geo::LineString;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection};
use serde_json::Map;
use xplane_navdata_parser::NavData;

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let data_dir = args_os()
        .nth(1)
        .expect("missing argument: directory containing apt.dat and earth_nav.dat");
    let geojson_path = args_os()
        .nth(2)
        .expect("missing argument: path to .geojson output");
    let nav_data = NavData::from_dir(Path::new(&data_dir)).expect("unsuccessful parse");

    let feature_collection = FeatureCollection::from_iter(nav_data.airports.iter().flat_map(|airport| {
        airport.runways.iter().enumerate().map(move |(idx, runway)| Feature {
            id: Some(Id::String(format!("{}-{idx}", airport.icao))),
            geometry: Some((&LineString::from(vec![runway.start, runway.end])).into()),
            properties: Some(Map::from_iter(vec![
                ("icao".to_string(), airport.icao.clone().into()),
                ("name".to_string(), airport.name.clone().into()),
            ])),
            ..Default::default()
        })
    }));

    fs::write(geojson_path, feature_collection.to_string()).expect("could not write .geojson");
}
