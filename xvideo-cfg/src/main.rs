use std::io::{stdin, stdout, BufReader, BufWriter, Write};
use xvideo::prelude::HardwareConfig;

fn main() {
    let cfg = BufReader::new(stdin());
    let cfg: HardwareConfig<4, 4, 4, 4> =
        serde_yaml::from_reader(cfg).expect("Failed to read config");
    if let Err(e) = cfg.validate() {
        panic!("Invalid hardware configuration: {e}");
    }
    let cfg = postcard::to_stdvec(&cfg).expect("Failed to serialize config");
    let mut out = BufWriter::new(stdout());
    out.write_all(&cfg)
        .expect("Failed to write configuration binary blob")
}
