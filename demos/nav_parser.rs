use std::{env::args_os, io, path::Path};

use xplane_navdata_parser::nav::EarthNavDat;

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let path = args_os()
        .nth(1)
        .expect("missing argument: path to earth_nav.dat");

    match EarthNavDat::from_path(Path::new(&path)) {
        Ok(earth_nav) => println!("{}", serde_json::to_string(&earth_nav).unwrap()),
        Err(e) => eprintln!("{e}"),
    }
}
