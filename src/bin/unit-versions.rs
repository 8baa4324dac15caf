use structopt::StructOpt;

/// Prints the DWARF version of every compilation unit in a binary's
/// `.debug_info` section.
#[derive(Debug, StructOpt)]
struct UnitVersions {
    filename: std::path::PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = UnitVersions::from_args();

    let buffer = std::fs::read(args.filename)?;
    let object = object::File::parse(&*buffer)?;

    let versions = dwarfscan::unit_versions_for_file(&object)?;
    if versions.is_empty() {
        eprintln!("WARN: no compilation units found");
    }
    for (offset, version) in &versions {
        println!("<.debug_info+0x{:08x}> DWARF version {}", offset.0, version);
    }

    Ok(())
}
