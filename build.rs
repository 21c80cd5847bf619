use entities::ENTITIES;
use std::io::Write;
use std::{env, path::PathBuf};

fn main() {
    let out_dir: PathBuf = env::var("OUT_DIR").unwrap().parse().unwrap();

    // entity::lookup is handed just the inner entity name, like "amp" for
    // "&amp;"; only references with a trailing ";" are recognised.
    //
    // entities::ENTITIES lists many names both with and without the trailing
    // ";", so keep those with it and strip the "&" and ";" before building
    // the map.
    let mut map = phf_codegen::Map::new();
    let mut longest = 0;
    let mut seen = std::collections::HashSet::new();
    for e in ENTITIES.iter() {
        if !(e.entity.starts_with('&') && e.entity.ends_with(';')) {
            continue;
        }
        let name = &e.entity[1..e.entity.len() - 1];
        if !seen.insert(name) {
            continue;
        }
        longest = longest.max(name.len());
        map.entry(name, &format!("{:?}", e.characters));
    }

    let out = std::fs::File::create(out_dir.join("entitydata.rs")).unwrap();
    let mut bw = std::io::BufWriter::new(out);
    writeln!(bw, "mod entitydata {{").unwrap();
    writeln!(bw, "    pub const MAX_LENGTH: usize = {};", longest).unwrap();
    writeln!(
        bw,
        "    pub static ENTITIES: phf::Map<&'static str, &'static str> = {};",
        map.build()
    )
    .unwrap();
    writeln!(bw, "}}").unwrap();
}
