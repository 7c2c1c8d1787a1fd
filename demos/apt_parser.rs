use std::{env::args_os, io, path::Path};

use xplane_navdata_parser::{apt::AptDat, ErrorPolicy};

fn main() {
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    let path = args_os().nth(1).expect("missing argument: path to apt.dat");

    match AptDat::from_path_with(Path::new(&path), ErrorPolicy::SkipLine) {
        Ok(apt_dat) => println!("{}", serde_json::to_string(&apt_dat).unwrap()),
        Err(e) => eprintln!("{e}"),
    }
}
