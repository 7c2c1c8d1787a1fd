use std::{env::args_os, io, path::Path};

use xplane_navdata_parser::{decca::build_decca_chains, nav::EarthNavDat, ErrorPolicy};

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let path = args_os()
        .nth(1)
        .expect("missing argument: path to earth_nav.dat");
    let earth_nav = EarthNavDat::from_path(Path::new(&path)).expect("unsuccessful parse");

    match build_decca_chains(&earth_nav.navaids, ErrorPolicy::SkipLine) {
        Ok(chains) => println!("{}", serde_json::to_string(&chains).unwrap()),
        Err(e) => eprintln!("{e}"),
    }
}
