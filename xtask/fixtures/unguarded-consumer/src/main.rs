use asp::isis_io::DiskImageResourceIsis;

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: unguarded-consumer <CUBE>");
        return;
    };

    match DiskImageResourceIsis::open(&path) {
        Ok(cube) => println!("{path}: {} x {} x {}", cube.cols(), cube.rows(), cube.planes()),
        Err(err) => eprintln!("{path}: {err}"),
    }
}
